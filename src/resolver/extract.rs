//! 纯文本链接抽取：HTML 进，URL 列表出，不做任何 I/O

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashSet;

use crate::offline::{is_audio_url, normalize_key};

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>\\()\[\]{}]+"#).expect("valid url regex")
});
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);")
        .expect("valid entity regex")
});

const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// 解码常见 HTML 实体（只解一层）
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            let ent = &caps[1];
            let decoded = match ent {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    let num = if let Some(hex) = ent.strip_prefix("#x").or(ent.strip_prefix("#X")) {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        ent.strip_prefix('#').and_then(|d| d.parse::<u32>().ok())
                    };
                    num.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_owned(), |c| c.to_string())
        })
        .into_owned()
}

/// 取出 URL 的主机名（小写，不含端口与 userinfo）
pub fn host_of(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or(rest);
    let authority = authority.rsplit('@').next().unwrap_or(authority);
    let host = authority.split(':').next().unwrap_or(authority);
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

/// 主机是否为 `domain` 或其子域
pub fn host_matches(url: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches("www.").to_ascii_lowercase();
    host_of(url).is_some_and(|h| h == domain || h.ends_with(&format!(".{domain}")))
}

pub fn is_forum_url(url: &str, forum_hosts: &[String]) -> bool {
    forum_hosts.iter().any(|h| host_matches(url, h))
}

/// 讨论页的 JSON 表示地址
pub fn forum_json_url(url: &str) -> String {
    format!("{}.json", normalize_key(url).trim_end_matches('/'))
}

/// 从讨论页 JSON 中取出正文 HTML 片段
///
/// 缺少该字段时退化为整个 payload 的字符串形式。
pub fn forum_fragment(payload: &Value) -> String {
    match payload
        .pointer("/0/data/children/0/data/selftext_html")
        .and_then(Value::as_str)
    {
        Some(html) => decode_entities(html),
        None => {
            tracing::debug!("讨论页 JSON 缺少 selftext_html，退化为整个 payload");
            payload.to_string()
        }
    }
}

/// 规范化链接：解实体、去尾部标点、去 fragment、去尾部 `/`，scheme 与主机转小写
pub fn normalize_link(raw: &str) -> Option<String> {
    let decoded = decode_entities(raw.trim());
    let trimmed = decoded.trim().trim_end_matches(TRAILING_PUNCT);
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);
    let link = without_fragment.trim_end_matches('/');

    let (scheme, rest) = link.split_once("://")?;
    let scheme = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return None;
    }
    let split_at = rest
        .find(|c| c == '/' || c == '?')
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(split_at);
    if authority.is_empty() {
        return None;
    }
    Some(format!("{scheme}://{}{tail}", authority.to_ascii_lowercase()))
}

/// 抽取指向 `host` 的全部链接：先扫属性，再扫原始文本；去重并保持顺序
///
/// 两次扫描都在解码实体后的文本上进行，否则 `&quot;` 包裹的链接会吞掉后面的标记。
pub fn extract_host_links(html: &str, host: &str) -> Vec<String> {
    let decoded = decode_entities(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let attr_values = ATTR_RE.captures_iter(&decoded).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
    });
    let raw_matches = URL_RE.find_iter(&decoded).map(|m| m.as_str());

    for candidate in attr_values.chain(raw_matches) {
        let Some(link) = normalize_link(candidate) else {
            continue;
        };
        if host_matches(&link, host) && seen.insert(link.clone()) {
            links.push(link);
        }
    }

    tracing::trace!(host, found = links.len(), "链接抽取完成");
    links
}

/// 抽取全部音频文件链接，去重并保持出现顺序
pub fn extract_audio_links(html: &str) -> Vec<String> {
    let decoded = decode_entities(html);
    let mut seen = HashSet::new();
    URL_RE
        .find_iter(&decoded)
        .filter_map(|m| normalize_link(m.as_str()))
        .filter(|link| is_audio_url(link))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
