use ratatui::layout::{Constraint, Direction, Layout, Rect};

const HEADER_HEIGHT: u16 = 3;
const TOAST_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const CATEGORIES_WIDTH: u16 = 30;

pub(super) struct CanvasLayout {
    pub header: Rect,
    pub body: Rect,
    pub toast: Rect,
    pub footer: Rect,
}

pub(super) struct HeaderLayout {
    pub title: Rect,
    pub search: Rect,
    pub status: Rect,
}

pub(super) struct BodyLayout {
    pub categories: Rect,
    pub tracks: Rect,
}

pub(super) fn split_canvas(canvas: Rect) -> CanvasLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(TOAST_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(canvas);

    CanvasLayout {
        header: chunks[0],
        body: chunks[1],
        toast: chunks[2],
        footer: chunks[3],
    }
}

pub(super) fn split_header(header: Rect) -> HeaderLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(header);

    HeaderLayout {
        title: rows[0],
        search: rows[1],
        status: rows[2],
    }
}

pub(super) fn split_body(body: Rect) -> BodyLayout {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(CATEGORIES_WIDTH), Constraint::Min(0)])
        .split(body);

    BodyLayout {
        categories: cols[0],
        tracks: cols[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_split_heights() {
        let layout = split_canvas(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.header.height, HEADER_HEIGHT);
        assert_eq!(layout.body.height, 40 - 9);
        assert_eq!(layout.toast.y, 34);
        assert_eq!(layout.footer.y, 37);
    }

    #[test]
    fn test_body_split_keeps_category_width() {
        let body = split_body(Rect::new(0, 3, 120, 30));
        assert_eq!(body.categories.width, CATEGORIES_WIDTH);
        assert_eq!(body.tracks.width, 120 - CATEGORIES_WIDTH);
    }
}
