use super::categories_view::draw_categories;
use super::header::draw_header;
use super::layout::{split_body, split_canvas, split_header};
use super::player_status::draw_footer;
use super::toast::{Toast, draw_toast};
use super::tracks_view::draw_tracks;
use crate::app::AppSnapshot;
use ratatui::Frame;

pub(super) fn draw_ui(f: &mut Frame, app: &AppSnapshot, toast: Option<&Toast>) {
    let canvas = split_canvas(f.area());
    draw_header(f, &split_header(canvas.header), app);

    let body = split_body(canvas.body);
    draw_categories(f, body.categories, app);
    draw_tracks(f, body.tracks, app);

    draw_toast(f, canvas.toast, toast);
    draw_footer(f, canvas.footer, &app.player);
}
