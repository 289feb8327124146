pub mod actor;
pub mod client;
pub mod config;
pub mod manifest;

pub use actor::{NetCommand, NetEvent, spawn_net_actor};
pub use client::FeedClient;
pub use config::FeedConfig;
pub use manifest::parse_manifest;
