use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ToastLevel {
    Info,
    Error,
}

impl ToastLevel {
    pub(super) fn duration(self) -> Duration {
        match self {
            ToastLevel::Info => Duration::from_secs(3),
            ToastLevel::Error => Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct Toast {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

impl Toast {
    fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: Instant::now() + level.duration(),
        }
    }

    pub(super) fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Info)
    }

    pub(super) fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Error)
    }

    pub(super) fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// 绘制 Toast 通知；没有通知时画一个空框占位
pub(super) fn draw_toast(f: &mut Frame, area: Rect, toast: Option<&Toast>) {
    let Some(toast) = toast else {
        f.render_widget(Block::default().borders(Borders::ALL), area);
        return;
    };
    let (icon, color) = match toast.level {
        ToastLevel::Error => ("✖", Color::Red),
        ToastLevel::Info => ("•", Color::Gray),
    };

    let paragraph = Paragraph::new(format!("{icon} {}", toast.message))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color));

    f.render_widget(paragraph, area);
}
