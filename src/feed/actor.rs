use std::collections::HashSet;
use std::path::PathBuf;

use tokio::sync::mpsc;

use super::FeedClient;
use crate::domain::Track;
use crate::offline::normalize_key;
use crate::resolver;

#[derive(Debug)]
pub enum NetCommand {
    /// 启动拦截层（install / activate）
    Init {
        req_id: u64,
    },
    LoadManifest {
        req_id: u64,
        force_refresh: bool,
    },
    Persist {
        req_id: u64,
        track_id: String,
        url: String,
    },
    Resolve {
        req_id: u64,
        track_id: String,
        source_url: String,
    },
    CheckCached {
        req_id: u64,
        url: String,
    },
}

#[derive(Debug)]
pub enum NetEvent {
    WorkerReady {
        req_id: u64,
        controlling: bool,
        error: Option<String>,
    },
    Manifest {
        req_id: u64,
        tracks: Vec<Track>,
        /// 已在离线缓存中的媒体地址（规范化后）
        cached: HashSet<String>,
    },
    Persisted {
        req_id: u64,
        track_id: String,
        url: String,
        path: PathBuf,
    },
    Resolved {
        req_id: u64,
        track_id: String,
        media_url: String,
    },
    CacheStatus {
        req_id: u64,
        url: String,
        cached: bool,
    },
    Error {
        req_id: u64,
        message: String,
        /// 解析时“没有找到匹配链接”，区别于抓取失败
        not_found: bool,
    },
}

async fn emit_error<E: std::fmt::Display>(
    tx_evt: &mpsc::Sender<NetEvent>,
    req_id: u64,
    ctx: &'static str,
    err: E,
    not_found: bool,
) {
    tracing::warn!(req_id, ctx, err = %err, "NetActor 请求失败");
    let _ = tx_evt
        .send(NetEvent::Error {
            req_id,
            message: err.to_string(),
            not_found,
        })
        .await;
}

/// 网络 actor：高优先级通道处理清单与解析，低优先级通道处理离线下载
///
/// `Init` 在循环内同步完成，保证 install 先于后续请求；其它命令各自 spawn，互不等待。
pub fn spawn_net_actor(
    client: FeedClient,
) -> (
    mpsc::Sender<NetCommand>,
    mpsc::Sender<NetCommand>,
    mpsc::Receiver<NetEvent>,
) {
    let (tx_hi, mut rx_hi) = mpsc::channel::<NetCommand>(64);
    let (tx_lo, mut rx_lo) = mpsc::channel::<NetCommand>(64);
    let (tx_evt, rx_evt) = mpsc::channel::<NetEvent>(64);

    tokio::spawn(async move {
        loop {
            let cmd = tokio::select! {
                biased;
                Some(cmd) = rx_hi.recv() => cmd,
                Some(cmd) = rx_lo.recv() => cmd,
                else => break,
            };

            if let NetCommand::Init { req_id } = cmd {
                let evt = match client.start_worker().await {
                    Ok(controlling) => NetEvent::WorkerReady {
                        req_id,
                        controlling,
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!(err = %e, "拦截层启动失败，请求将直接走网络");
                        NetEvent::WorkerReady {
                            req_id,
                            controlling: false,
                            error: Some(e.to_string()),
                        }
                    }
                };
                let _ = tx_evt.send(evt).await;
                continue;
            }

            let client = client.clone();
            let tx_evt = tx_evt.clone();
            tokio::spawn(async move {
                handle_command(cmd, &client, &tx_evt).await;
            });
        }
        tracing::debug!("NetActor 退出");
    });

    (tx_hi, tx_lo, rx_evt)
}

async fn handle_command(cmd: NetCommand, client: &FeedClient, tx_evt: &mpsc::Sender<NetEvent>) {
    match cmd {
        NetCommand::Init { .. } => {}
        NetCommand::LoadManifest {
            req_id,
            force_refresh,
        } => match client.load_manifest(force_refresh).await {
            Ok(tracks) => {
                let cached = tracks
                    .iter()
                    .filter(|t| client.is_cached(&t.media_url))
                    .map(|t| normalize_key(&t.media_url).to_owned())
                    .collect();
                let _ = tx_evt
                    .send(NetEvent::Manifest {
                        req_id,
                        tracks,
                        cached,
                    })
                    .await;
            }
            Err(e) => emit_error(tx_evt, req_id, "LoadManifest", e, false).await,
        },
        NetCommand::Persist {
            req_id,
            track_id,
            url,
        } => match client.persist(&url).await {
            Ok(path) => {
                let _ = tx_evt
                    .send(NetEvent::Persisted {
                        req_id,
                        track_id,
                        url,
                        path,
                    })
                    .await;
            }
            Err(e) => emit_error(tx_evt, req_id, "Persist", e, false).await,
        },
        NetCommand::Resolve {
            req_id,
            track_id,
            source_url,
        } => match resolver::resolve_media_url(client, &source_url).await {
            Ok(res) => {
                let _ = tx_evt
                    .send(NetEvent::Resolved {
                        req_id,
                        track_id,
                        media_url: res.media_url,
                    })
                    .await;
            }
            Err(e) => {
                let not_found = e.is_not_found();
                emit_error(tx_evt, req_id, "Resolve", e, not_found).await;
            }
        },
        NetCommand::CheckCached { req_id, url } => {
            let cached = client.is_cached(&url);
            let _ = tx_evt
                .send(NetEvent::CacheStatus {
                    req_id,
                    url,
                    cached,
                })
                .await;
        }
    }
}
