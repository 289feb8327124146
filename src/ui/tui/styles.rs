use ratatui::style::{Color, Modifier, Style};

pub(super) fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    }
}

pub(super) fn highlight_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

pub(super) fn header_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub(super) fn playing_style() -> Style {
    Style::default().fg(Color::Green)
}
