use super::styles::{focus_style, highlight_style, playing_style};
use super::utils::truncate_width;
use super::widgets::table_state;
use crate::app::{AppSnapshot, Focus, LoadState, TrackRow};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
};

const TITLE_MAX: usize = 80;

fn action_text(row: &TrackRow) -> String {
    if row.resolving {
        format!("{} | Resolving...", row.download.as_str())
    } else {
        row.download.as_str().to_owned()
    }
}

fn track_row(row: &TrackRow) -> Row<'static> {
    let mut title = truncate_width(&row.title, TITLE_MAX);
    if let Some(flair) = &row.flair {
        title = format!("{title} [{flair}]");
    }
    let style = if row.playing {
        playing_style()
    } else {
        Style::default()
    };
    Row::new(vec![
        Cell::from(title),
        Cell::from(row.author.clone()),
        Cell::from(row.duration.clone()),
        Cell::from(action_text(row)),
    ])
    .style(style)
}

fn placeholder(text: &str, color: Color) -> Row<'static> {
    Row::new(vec![Cell::from(text.to_owned())]).style(Style::default().fg(color))
}

pub(super) fn draw_tracks(f: &mut Frame, area: Rect, app: &AppSnapshot) {
    let active = matches!(app.focus, Focus::Tracks);

    let (rows, selected) = match &app.load_state {
        LoadState::Loading => (vec![placeholder("Loading...", Color::Gray)], None),
        LoadState::Failed(_) => (vec![placeholder("Failed to load tracks.", Color::Red)], None),
        LoadState::Ready if app.rows.is_empty() => {
            (vec![placeholder("No tracks match.", Color::Gray)], None)
        }
        LoadState::Ready => (
            app.rows.iter().map(track_row).collect(),
            Some(app.selected_row),
        ),
    };

    let header = Row::new(vec!["Title", "Artist", "Duration", "Actions"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Min(30),
            Constraint::Length(18),
            Constraint::Length(9),
            Constraint::Length(28),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(active))
            .title("Tracks"),
    )
    .row_highlight_style(highlight_style(active));

    f.render_stateful_widget(table, area, &mut table_state(selected));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DownloadLabel;

    fn row() -> TrackRow {
        TrackRow {
            id: "a".to_owned(),
            title: "Hello".to_owned(),
            author: "someone".to_owned(),
            duration: "12:00".to_owned(),
            flair: None,
            download: DownloadLabel::PlayOffline,
            resolving: false,
            playing: false,
        }
    }

    #[test]
    fn test_action_text_shows_download_label() {
        assert_eq!(action_text(&row()), "Play Offline");
    }

    #[test]
    fn test_action_text_marks_resolving() {
        let r = TrackRow {
            resolving: true,
            download: DownloadLabel::Downloading,
            ..row()
        };
        assert_eq!(action_text(&r), "Downloading... | Resolving...");
    }
}
