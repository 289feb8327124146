use clap::Parser;
use gwasi_ratui::app::{App, AppSnapshot, Library};
use gwasi_ratui::audio_worker::AudioBackend;
use gwasi_ratui::error::AppError;
use gwasi_ratui::feed::{FeedClient, FeedConfig};
use gwasi_ratui::offline::{AUDIO_CACHE, SHELL_CACHE};
use gwasi_ratui::ui::{Cli, Command, run_tui};
use gwasi_ratui::{core, logging, resolver};

fn feed_config(cli: &Cli) -> FeedConfig {
    let mut cfg = FeedConfig::default();
    if let Some(v) = cli.data_dir.clone() {
        cfg.data_dir = v;
    }
    if let Some(v) = cli.manifest_url.clone() {
        cfg.shell_resources = vec![v.clone()];
        cfg.manifest_url = v;
    }
    if let Some(v) = cli.proxy.clone() {
        cfg.proxy_prefix = Some(v);
    }
    if cli.no_proxy {
        cfg.proxy_prefix = None;
    }
    cfg
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let cfg = feed_config(&cli);

    let audio_backend = if cli.no_audio {
        AudioBackend::Null
    } else {
        AudioBackend::Real
    };

    let _log_guard = logging::init(
        &cfg.data_dir,
        logging::LogConfig {
            dir: cli.log_dir.clone(),
            filter: cli.log_filter.clone(),
        },
    );
    tracing::info!(data_dir = %cfg.data_dir.display(), "gwasi-ratui 启动");

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let (tx, rx) = core::spawn_app_actor(cfg, audio_backend)?;
            run_tui(AppSnapshot::from_app(&App::default()), tx, rx).await?;
            Ok(())
        }
        Command::List {
            query,
            categories,
            refresh,
        } => {
            tracing::info!("启动模式: List");
            let client = FeedClient::new(cfg)?;
            let tracks = client.load_manifest(refresh).await?;
            let mut library = Library::new(tracks);
            library.restore_selection(&categories);
            library.set_query(query);

            let visible = library.visible();
            for track in visible.iter().filter_map(|&i| library.track(i)) {
                let mark = if client.is_cached(&track.media_url) {
                    "*"
                } else {
                    " "
                };
                let posted = chrono::DateTime::from_timestamp(track.timestamp, 0)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_owned());
                println!(
                    "{mark} {posted} [{}] {} - {} ({})  {}",
                    track.category, track.title, track.author, track.duration, track.media_url
                );
            }
            println!(
                "{} / {} tracks, categories {}",
                visible.len(),
                library.tracks().len(),
                library.summary()
            );
            Ok(())
        }
        Command::Resolve { url } => {
            tracing::info!("启动模式: Resolve");
            let client = FeedClient::new(cfg)?;
            let resolution = resolver::resolve_media_url(&client, &url).await?;
            for link in &resolution.source_links {
                println!("link: {link}");
            }
            println!("{}", resolution.media_url);
            Ok(())
        }
        Command::Fetch { url } => {
            tracing::info!("启动模式: Fetch");
            let client = FeedClient::new(cfg)?;
            let path = client.persist(&url).await?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Cache => {
            let client = FeedClient::new(cfg)?;
            let storage = client.storage();
            println!("cache root: {}", storage.root().display());
            for name in storage.keys()? {
                let stats = storage.open(&name)?.stats();
                let role = match name.as_str() {
                    SHELL_CACHE => " (shell)",
                    AUDIO_CACHE => " (audio)",
                    _ => "",
                };
                println!(
                    "{name}{role}: {} entries, {} bytes",
                    stats.entries, stats.bytes
                );
            }
            Ok(())
        }
    }
}
