use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "gwasi-ratui.log";
const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// 持有后台写线程的 guard；drop 时刷盘
pub struct LogGuard(#[allow(dead_code)] Option<WorkerGuard>);

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    pub filter: Option<String>,
}

/// 日志目录：显式配置优先，否则 `{data_dir}/logs`；无法创建时退回临时目录
pub fn resolve_log_dir(data_dir: &Path, dir: Option<PathBuf>) -> PathBuf {
    let log_dir = dir.unwrap_or_else(|| data_dir.join("logs"));
    match fs::create_dir_all(&log_dir) {
        Ok(()) => log_dir,
        Err(_) => std::env::temp_dir().join("gwasi-ratui-logs"),
    }
}

fn build_filter(filter: Option<String>) -> EnvFilter {
    match filter {
        Some(s) if !s.trim().is_empty() => {
            EnvFilter::try_new(&s).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        }
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// TUI 独占终端，日志只写文件
pub fn init(data_dir: &Path, cfg: LogConfig) -> LogGuard {
    let log_dir = resolve_log_dir(data_dir, cfg.dir);
    let _ = fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer);

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(cfg.filter))
        .with(file_layer);

    let _ = subscriber.try_init();
    tracing::info!(log_dir = %log_dir.display(), "tracing 已初始化");

    LogGuard(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_defaults_under_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log_dir = resolve_log_dir(dir.path(), None);
        assert_eq!(log_dir, dir.path().join("logs"));
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_explicit_log_dir_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let custom = dir.path().join("custom");
        assert_eq!(resolve_log_dir(dir.path(), Some(custom.clone())), custom);
    }

    #[test]
    fn test_invalid_filter_falls_back() {
        // 非法过滤串不应 panic
        let _ = build_filter(Some("[[[".to_owned()));
        let _ = build_filter(Some("   ".to_owned()));
    }
}
