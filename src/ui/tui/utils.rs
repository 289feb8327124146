use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(super) fn fmt_mmss(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// 按显示宽度截断，超出部分以 `…` 结尾
pub(super) fn truncate_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_owned();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

pub(super) fn volume_percent(volume: f32) -> u32 {
    (volume.clamp(0.0, 2.0) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_mmss() {
        assert_eq!(fmt_mmss(83_000), "01:23");
        assert_eq!(fmt_mmss(999), "00:00");
    }

    #[test]
    fn test_truncate_width() {
        assert_eq!(truncate_width("Hello", 10), "Hello");
        assert_eq!(truncate_width("Hello World", 6), "Hello…");
        // 全角字符占两列
        assert_eq!(truncate_width("你好世界", 5), "你好…");
    }

    #[test]
    fn test_volume_percent() {
        assert_eq!(volume_percent(0.7), 70);
        assert_eq!(volume_percent(5.0), 200);
    }
}
