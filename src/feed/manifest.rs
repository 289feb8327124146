//! 清单格式：`{"entries": [[id, category, author, flair, title, timestamp, duration, comments, user], ...]}`

use serde::Deserialize;
use serde_json::Value;

use super::config::expand_media_url;
use crate::domain::Track;

#[derive(Debug, Deserialize)]
pub struct ManifestResp {
    #[serde(default)]
    pub entries: Vec<Value>,
}

pub fn parse_manifest(bytes: &[u8], media_url_template: &str) -> Result<Vec<Track>, serde_json::Error> {
    let resp = serde_json::from_slice::<ManifestResp>(bytes)?;
    Ok(to_tracks(resp, media_url_template))
}

pub fn to_tracks(resp: ManifestResp, media_url_template: &str) -> Vec<Track> {
    resp.entries
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let track = to_track(row, media_url_template);
            if track.is_none() {
                tracing::warn!(index, "清单条目缺少 id，已跳过");
            }
            track
        })
        .collect()
}

fn to_track(row: &Value, media_url_template: &str) -> Option<Track> {
    let row = row.as_array()?;
    let id = text_at(row, 0).filter(|s| !s.is_empty())?;
    Some(Track {
        media_url: expand_media_url(media_url_template, &id),
        category: text_at(row, 1).unwrap_or_default(),
        author: text_at(row, 2).unwrap_or_default(),
        flair: text_at(row, 3).filter(|s| !s.is_empty()),
        title: text_at(row, 4).unwrap_or_default(),
        timestamp: int_at(row, 5),
        duration: text_at(row, 6).unwrap_or_default(),
        comments: int_at(row, 7),
        user: text_at(row, 8).unwrap_or_default(),
        id,
    })
}

fn text_at(row: &[Value], i: usize) -> Option<String> {
    match row.get(i)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn int_at(row: &[Value], i: usize) -> i64 {
    match row.get(i) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::config::DEFAULT_MEDIA_URL_TEMPLATE;

    #[test]
    fn parses_example_entry() {
        let json = br#"{"entries":[["abc","funny","alice",null,"Hello World",0,"1:23",5,"u1"]]}"#;
        let tracks = parse_manifest(json, DEFAULT_MEDIA_URL_TEMPLATE).expect("parse");
        assert_eq!(tracks.len(), 1);
        let t = &tracks[0];
        assert_eq!(t.id, "abc");
        assert_eq!(t.category, "funny");
        assert_eq!(t.author, "alice");
        assert_eq!(t.flair, None);
        assert_eq!(t.title, "Hello World");
        assert_eq!(t.timestamp, 0);
        assert_eq!(t.duration, "1:23");
        assert_eq!(t.comments, 5);
        assert_eq!(t.user, "u1");
        assert_eq!(t.media_url, "https://gwasi.com/audio/abc.m4a");
    }

    #[test]
    fn skips_rows_without_id_and_tolerates_short_rows() {
        let json = br#"{"entries":[[null,"x"],["id2","cat"],"garbage",[42,"c","a","F","T",1700000000.5,95,"7"]]}"#;
        let tracks = parse_manifest(json, "{id}").expect("parse");
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, "id2");
        assert_eq!(tracks[0].title, "");
        assert_eq!(tracks[1].id, "42");
        assert_eq!(tracks[1].flair.as_deref(), Some("F"));
        assert_eq!(tracks[1].timestamp, 1_700_000_000);
        assert_eq!(tracks[1].duration, "95");
        assert_eq!(tracks[1].comments, 7);
        assert_eq!(tracks[1].media_url, "42");
    }

    #[test]
    fn missing_entries_is_empty() {
        let tracks = parse_manifest(b"{}", DEFAULT_MEDIA_URL_TEMPLATE).expect("parse");
        assert!(tracks.is_empty());
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_manifest(b"<html>", DEFAULT_MEDIA_URL_TEMPLATE).is_err());
    }
}
