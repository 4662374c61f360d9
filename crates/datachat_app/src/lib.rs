mod classifier;
mod data_chat;
mod dataset;
mod executor;
mod oracle;
mod prompts;
mod session;
mod synthesizer;
mod template_engine;

#[cfg(test)]
mod test_utils;

pub use classifier::*;
pub use data_chat::*;
pub use dataset::*;
pub use executor::*;
pub use prompts::*;
pub use session::*;
pub use synthesizer::*;
pub use template_engine::*;
