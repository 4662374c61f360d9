mod app_config;
mod generation_config;
mod http_config;

pub use app_config::*;
pub use generation_config::*;
pub use http_config::*;
