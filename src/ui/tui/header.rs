use super::layout::HeaderLayout;
use super::styles::{focus_style, header_style};
use crate::app::{AppSnapshot, Focus, LoadState};
use ratatui::{
    Frame,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

pub(super) fn draw_header(f: &mut Frame, layout: &HeaderLayout, app: &AppSnapshot) {
    let offline = if app.offline_ready {
        Span::styled("  [offline ready]", Style::default().fg(Color::Green))
    } else {
        Span::styled("  [online]", Style::default().fg(Color::DarkGray))
    };
    let title = Line::from(vec![Span::styled("gwasi audio", header_style()), offline]);
    f.render_widget(Paragraph::new(title), layout.title);

    let search = if app.query.is_empty() {
        "Search: (type to filter, Esc clears)".to_owned()
    } else {
        format!("Search: {}", app.query)
    };
    f.render_widget(
        Paragraph::new(search).style(focus_style(matches!(app.focus, Focus::Tracks))),
        layout.search,
    );

    let shown = format!("{} / {} tracks", app.rows.len(), app.total_tracks);
    let status = match &app.load_state {
        LoadState::Loading => "Loading tracks...".to_owned(),
        LoadState::Failed(_) => "Failed to load tracks. Ctrl+L to retry".to_owned(),
        LoadState::Ready => format!("{shown} | {}", app.status),
    };
    f.render_widget(Paragraph::new(status), layout.status);
}
