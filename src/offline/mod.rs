mod controller;
pub mod intercept;
pub mod storage;

pub use controller::OfflineController;
pub use intercept::{FetchSource, InterceptRequest, InterceptResponse, InterceptWorker, is_audio_url};
pub use storage::{AUDIO_CACHE, CacheStorage, PartitionStats, SHELL_CACHE, normalize_key};
