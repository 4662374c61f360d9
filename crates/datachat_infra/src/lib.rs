mod dto;
mod gemini;
mod http;
mod loader;

pub use gemini::*;
pub use http::*;
pub use loader::*;
