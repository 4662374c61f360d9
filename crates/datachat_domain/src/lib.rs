mod error;
mod history;
mod oracle;
mod record;
mod schema;
mod template;

pub use datachat_config::GenerationConfig;
pub use error::*;
pub use history::*;
pub use oracle::*;
pub use record::*;
pub use schema::*;
pub use template::*;
