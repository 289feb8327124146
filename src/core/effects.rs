use crate::app::App;
use crate::app::AppSnapshot;
use crate::audio_worker::AudioCommand;
use crate::error::MessageError;
use crate::feed::NetCommand;
use crate::messages::app::AppEvent;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct CoreEffects {
    pub(super) actions: Vec<CoreEffect>,
}

#[derive(Debug)]
pub enum CoreEffect {
    EmitState(Box<AppSnapshot>),
    EmitToast(String),
    EmitError(MessageError),
    SendNetHi {
        cmd: NetCommand,
        warn: Option<&'static str>,
    },
    SendNetLo {
        cmd: NetCommand,
        warn: Option<&'static str>,
    },
    SendAudio {
        cmd: AudioCommand,
        warn: Option<&'static str>,
    },
    /// 在系统浏览器中打开原始讨论页
    OpenBrowser {
        url: String,
    },
}

impl CoreEffects {
    pub fn emit_state(&mut self, app: &App) {
        self.actions
            .push(CoreEffect::EmitState(Box::new(AppSnapshot::from_app(app))));
    }

    pub fn send_net_hi_warn(&mut self, cmd: NetCommand, warn: &'static str) {
        self.actions.push(CoreEffect::SendNetHi {
            cmd,
            warn: Some(warn),
        });
    }

    pub fn send_net_lo_warn(&mut self, cmd: NetCommand, warn: &'static str) {
        self.actions.push(CoreEffect::SendNetLo {
            cmd,
            warn: Some(warn),
        });
    }

    pub fn send_audio(&mut self, cmd: AudioCommand) {
        self.actions.push(CoreEffect::SendAudio { cmd, warn: None });
    }

    pub fn send_audio_warn(&mut self, cmd: AudioCommand, warn: &'static str) {
        self.actions.push(CoreEffect::SendAudio {
            cmd,
            warn: Some(warn),
        });
    }

    pub fn open_browser(&mut self, url: impl Into<String>) {
        self.actions.push(CoreEffect::OpenBrowser { url: url.into() });
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.actions.push(CoreEffect::EmitToast(message.into()));
    }

    pub fn error(&mut self, err: MessageError) {
        self.actions.push(CoreEffect::EmitError(err));
    }
}

pub struct CoreDispatch<'a> {
    pub(super) tx_net_hi: &'a mpsc::Sender<NetCommand>,
    pub(super) tx_net_lo: &'a mpsc::Sender<NetCommand>,
    pub(super) tx_audio: &'a mpsc::Sender<AudioCommand>,
    pub(super) tx_evt: &'a mpsc::Sender<AppEvent>,
}

pub async fn run_effects(effects: CoreEffects, dispatch: &CoreDispatch<'_>) {
    for effect in effects.actions {
        match effect {
            CoreEffect::EmitState(app) => {
                let _ = dispatch.tx_evt.send(AppEvent::State(app)).await;
            }
            CoreEffect::EmitToast(msg) => {
                let _ = dispatch.tx_evt.send(AppEvent::Toast(msg)).await;
            }
            CoreEffect::EmitError(err) => {
                let _ = dispatch.tx_evt.send(AppEvent::Error(err)).await;
            }
            CoreEffect::SendNetHi { cmd, warn } => {
                if let Err(e) = dispatch.tx_net_hi.send(cmd).await
                    && let Some(ctx) = warn
                {
                    tracing::warn!(err = %e, "{ctx}");
                }
            }
            CoreEffect::SendNetLo { cmd, warn } => {
                if let Err(e) = dispatch.tx_net_lo.send(cmd).await
                    && let Some(ctx) = warn
                {
                    tracing::warn!(err = %e, "{ctx}");
                }
            }
            CoreEffect::SendAudio { cmd, warn } => {
                if let Err(e) = dispatch.tx_audio.send(cmd).await
                    && let Some(ctx) = warn
                {
                    tracing::warn!(err = %e, "{ctx}");
                }
            }
            CoreEffect::OpenBrowser { url } => {
                let tx_evt = dispatch.tx_evt.clone();
                // webbrowser::open 会阻塞到浏览器进程启动
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = webbrowser::open(&url) {
                        tracing::warn!(url = %url, err = %e, "打开原始页面失败");
                        let _ = tx_evt.blocking_send(AppEvent::Error(MessageError::OpenSource {
                            url,
                            detail: e.to_string(),
                        }));
                    }
                });
            }
        }
    }
}
