//! 离线缓存存储相关错误

/// 缓存操作错误类型
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// 缓存目录不可用
    #[error("缓存目录不可用")]
    DirUnavailable,

    /// 分区名不合法（为空或包含路径分隔符）
    #[error("缓存分区名无效: {0:?}")]
    InvalidPartition(String),

    /// 文件操作失败
    #[error("文件操作失败: {0}")]
    FileOp(#[from] std::io::Error),

    /// 元数据序列化失败
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}
