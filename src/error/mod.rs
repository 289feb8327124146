//! 统一错误处理模块
//!
//! 提供项目中所有模块的结构化错误类型，替代 String 错误。

mod app;
mod audio;
mod cache;
mod feed;
mod message;
mod resolve;

// 重新导出所有错误类型，便于使用
pub use app::{AppError, SettingsError};
pub use audio::AudioError;
pub use cache::CacheError;
pub use feed::FeedError;
pub use message::MessageError;
pub use resolve::ResolveError;
