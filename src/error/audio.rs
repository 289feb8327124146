//! 音频播放相关错误

use std::path::PathBuf;

/// 音频播放错误类型
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// 打开音频文件失败
    #[error("打开音频文件失败({title}): {source}")]
    OpenFile {
        title: String,
        #[source]
        source: std::io::Error,
    },

    /// 解码音频失败
    #[error("解码音频失败({title}): {source}")]
    Decode {
        title: String,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    /// 输出设备初始化失败
    #[error("初始化音频输出失败: {0}")]
    OutputStream(String),

    /// 音频文件不存在
    #[error("音频文件不存在: {}", .0.display())]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_display() {
        let err = AudioError::FileNotFound(PathBuf::from("/tmp/missing.m4a"));
        assert!(err.to_string().contains("missing.m4a"));
    }
}
