pub mod model;

pub use model::{CategoryCount, Track};
