mod cli;
mod model;
mod ui;

pub use cli::*;
pub use model::*;
pub use ui::*;
