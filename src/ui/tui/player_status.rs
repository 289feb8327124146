use super::utils::{fmt_mmss, volume_percent};
use crate::app::PlayerSnapshot;
use ratatui::{
    Frame,
    prelude::Rect,
    text::{Line, Text},
    widgets::Paragraph,
};

pub(super) fn player_line(player: &PlayerSnapshot) -> String {
    let now = player.now_playing.as_deref().unwrap_or("-");
    let total = player
        .play_total_ms
        .map(fmt_mmss)
        .unwrap_or_else(|| "--:--".to_owned());
    format!(
        "Now: {now} | {}{} | {total} | Volume: {}%",
        player.play_status,
        if player.paused { " (paused)" } else { "" },
        volume_percent(player.volume),
    )
}

pub(super) fn draw_footer(f: &mut Frame, area: Rect, player: &PlayerSnapshot) {
    let lines = vec![
        Line::from(player_line(player)),
        Line::from(
            "Enter play | Ctrl+D download | Ctrl+R resolve | Ctrl+O open source | Ctrl+P pause | Ctrl+S stop",
        ),
        Line::from(
            "Tab focus | Space toggle | a/n all/none | +/- volume | Ctrl+L reload | Ctrl+Q quit",
        ),
    ];
    f.render_widget(Paragraph::new(Text::from(lines)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_line() {
        let player = PlayerSnapshot {
            now_playing: Some("Hello".to_owned()),
            play_status: "Playing".to_owned(),
            paused: true,
            play_total_ms: Some(61_000),
            volume: 0.5,
        };
        assert_eq!(
            player_line(&player),
            "Now: Hello | Playing (paused) | 01:01 | Volume: 50%"
        );
    }
}
