use gwasi_ratui::resolver::extract::{
    extract_audio_links, extract_host_links, forum_json_url, is_forum_url, normalize_link,
};

#[test]
fn host_links_are_unique_and_normalized() {
    let html = r#"<div><a href="HTTPS://SoundGasm.net/u/alice/One/">one</a>
        https://soundgasm.net/u/alice/One#frag
        <a href='https://soundgasm.net/u/alice/Two'>two</a>
        (see https://soundgasm.net/u/alice/Three).</div>"#;
    let links = extract_host_links(html, "soundgasm.net");
    assert_eq!(
        links,
        vec![
            "https://soundgasm.net/u/alice/One",
            "https://soundgasm.net/u/alice/Two",
            "https://soundgasm.net/u/alice/Three",
        ]
    );
}

#[test]
fn audio_links_are_found_in_scripts() {
    let html = r#"<script>var m4a = "https://media.soundgasm.net/sounds/abc.m4a";
        var again = "https://media.soundgasm.net/sounds/abc.m4a";</script>"#;
    assert_eq!(
        extract_audio_links(html),
        vec!["https://media.soundgasm.net/sounds/abc.m4a"]
    );
}

#[test]
fn page_without_audio_yields_nothing() {
    assert!(extract_audio_links("<p>https://example.com/page</p>").is_empty());
}

#[test]
fn non_http_links_are_rejected() {
    assert_eq!(normalize_link("ftp://soundgasm.net/u/a"), None);
    assert_eq!(normalize_link("https://"), None);
}

#[test]
fn forum_urls_switch_to_json() {
    let hosts = vec!["reddit.com".to_owned()];
    let url = "https://www.reddit.com/r/funny/comments/abc";
    assert!(is_forum_url(url, &hosts));
    assert!(!is_forum_url("https://soundgasm.net/u/a", &hosts));
    assert!(forum_json_url(url).ends_with(".json"));
}
