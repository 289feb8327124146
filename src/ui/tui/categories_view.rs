use super::styles::{focus_style, highlight_style};
use super::widgets::list_state;
use crate::app::{AppSnapshot, Focus};
use ratatui::{
    Frame,
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, List, ListItem},
};

pub(super) fn category_line(name: &str, count: usize, enabled: bool) -> String {
    let mark = if enabled { "[x]" } else { "[ ]" };
    format!("{mark} {name} ({count})")
}

pub(super) fn draw_categories(f: &mut Frame, area: Rect, app: &AppSnapshot) {
    let active = matches!(app.focus, Focus::Categories);
    let items: Vec<ListItem> = app
        .categories
        .iter()
        .map(|c| ListItem::new(Line::from(category_line(&c.name, c.count, c.enabled))))
        .collect();

    let selected = (!app.categories.is_empty()).then_some(app.category_selected);
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(active))
                .title(format!("Categories: {}", app.category_summary)),
        )
        .highlight_style(highlight_style(active));
    f.render_stateful_widget(list, area, &mut list_state(selected));
}
