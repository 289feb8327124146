use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gwasi-ratui",
    version,
    about = "gwasi 音频目录的终端播放器（Rust + ratatui）"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// 覆盖数据目录（默认走系统 data_local_dir）
    #[arg(long, env = "GWASI_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// 覆盖日志目录（默认 `{data_dir}/logs`）
    #[arg(long, env = "GWASI_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// 覆盖日志过滤（等价于设置 RUST_LOG）
    #[arg(long, env = "RUST_LOG")]
    pub log_filter: Option<String>,

    /// 覆盖清单地址（默认 https://gwasi.com/delta.json）
    #[arg(long, env = "GWASI_MANIFEST_URL")]
    pub manifest_url: Option<String>,

    /// 覆盖页面请求的代理前缀（默认 https://corsproxy.io/?）
    #[arg(long, env = "GWASI_PROXY")]
    pub proxy: Option<String>,

    /// 页面请求不经过代理
    #[arg(long, conflicts_with = "proxy")]
    pub no_proxy: bool,

    /// 不打开音频设备（只下载，不发声）
    #[arg(long, env = "GWASI_NO_AUDIO")]
    pub no_audio: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 运行 TUI（默认）
    Tui,

    /// 无交互：打印过滤后的曲目列表
    List {
        /// 标题或作者包含的关键词
        #[arg(long, default_value = "")]
        query: String,

        /// 启用的分类（可重复）；缺省为出现次数最多的分类
        #[arg(long = "category")]
        categories: Vec<String>,

        /// 忽略缓存，重新请求清单
        #[arg(long)]
        refresh: bool,
    },

    /// 解析讨论页，打印音频地址
    Resolve { url: String },

    /// 下载到离线缓存，打印本地路径
    Fetch { url: String },

    /// 打印缓存分区统计
    Cache,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_categories() {
        let cli = Cli::try_parse_from([
            "gwasi-ratui",
            "list",
            "--query",
            "hello",
            "--category",
            "funny",
            "--category",
            "asmr",
        ])
        .expect("parse");
        match cli.command {
            Some(Command::List {
                query, categories, ..
            }) => {
                assert_eq!(query, "hello");
                assert_eq!(categories, vec!["funny", "asmr"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_no_proxy_conflicts_with_proxy() {
        let res = Cli::try_parse_from([
            "gwasi-ratui",
            "--proxy",
            "https://p/?",
            "--no-proxy",
        ]);
        assert!(res.is_err());
    }
}
