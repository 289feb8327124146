pub mod library;
pub mod state;

pub use library::Library;
pub use state::*;
