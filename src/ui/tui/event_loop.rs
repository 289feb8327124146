use super::guard::TuiGuard;
use super::keyboard::handle_key;
use super::mouse::handle_mouse;
use super::toast::Toast;
use super::views::draw_ui;
use crate::app::AppSnapshot;
use crate::messages::app::{AppCommand, AppEvent};
use crossterm::event::{self, Event};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub(super) async fn run_tui_internal(
    mut app: AppSnapshot,
    tx: mpsc::Sender<AppCommand>,
    mut rx: mpsc::Receiver<AppEvent>,
) -> io::Result<()> {
    let _guard = TuiGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let _ = tx.send(AppCommand::Bootstrap).await;

    let tick_rate = Duration::from_millis(200);
    let mut toast: Option<Toast> = None;

    loop {
        while let Ok(evt) = rx.try_recv() {
            match evt {
                AppEvent::State(s) => app = *s,
                AppEvent::Toast(s) => toast = Some(Toast::info(s)),
                AppEvent::Error(e) => toast = Some(Toast::error(e.to_string())),
            }
        }
        if toast.as_ref().is_some_and(|t| t.is_expired_at(Instant::now())) {
            toast = None;
        }

        terminal.draw(|f| draw_ui(f, &app, toast.as_ref()))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(&app, key, &tx).await {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&app, mouse, &tx).await,
                _ => {}
            }
        }

        // 核心 actor 已退出
        if tx.is_closed() {
            break;
        }
    }

    // 等核心 actor 保存完设置后再交还终端
    drop(tx);
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while rx.recv().await.is_some() {}
    })
    .await;

    Ok(())
}
