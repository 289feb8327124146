use gwasi_ratui::app::{App, AppSnapshot, Library, LoadState};
use gwasi_ratui::feed::config::DEFAULT_MEDIA_URL_TEMPLATE;
use gwasi_ratui::feed::parse_manifest;

const MANIFEST: &[u8] = br#"{"entries":[
    ["abc","funny","alice",null,"Hello World",0,"1:23",5,"u1"],
    ["def","funny","bob","OC","Rainy Night",1,"10:00",0,"u2"],
    ["ghi","asmr","Alice","","Soft Whisper",2,"3:00",1,"u3"],
    ["jkl","funny","carol",null,"hello again",3,"0:45",2,"u4"]
]}"#;

fn library() -> Library {
    Library::new(parse_manifest(MANIFEST, DEFAULT_MEDIA_URL_TEMPLATE).expect("parse"))
}

#[test]
fn example_manifest_renders_one_row() {
    let json = br#"{"entries":[["abc","funny","alice",null,"Hello World",0,"1:23",5,"u1"]]}"#;
    let tracks = parse_manifest(json, DEFAULT_MEDIA_URL_TEMPLATE).expect("parse");
    let app = App {
        library: Library::new(tracks),
        load_state: LoadState::Ready,
        ..App::default()
    };

    let snap = AppSnapshot::from_app(&app);
    assert_eq!(snap.rows.len(), 1);
    assert_eq!(snap.rows[0].title, "Hello World");
    assert_eq!(snap.rows[0].author, "alice");
    assert_eq!(snap.rows[0].duration, "1:23");
    assert_eq!(
        app.library.tracks()[0].media_url,
        "https://gwasi.com/audio/abc.m4a"
    );
    assert_eq!(snap.category_summary, "1/1");
}

#[test]
fn most_common_category_is_selected_by_default() {
    let lib = library();
    assert!(lib.is_selected("funny"));
    assert!(!lib.is_selected("asmr"));
    assert_eq!(lib.visible().len(), 3);
    assert_eq!(lib.summary(), "1/2");
}

#[test]
fn query_matches_title_or_author_case_insensitively() {
    let mut lib = library();
    lib.select_all();
    lib.set_query("ALICE");
    let ids: Vec<&str> = lib
        .visible()
        .into_iter()
        .filter_map(|i| lib.track(i))
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(ids, vec!["abc", "ghi"]);

    lib.set_query("hello");
    assert_eq!(lib.visible().len(), 2);
}

#[test]
fn visible_rows_keep_manifest_order_and_respect_categories() {
    let mut lib = library();
    lib.select_none();
    assert!(lib.visible().is_empty());

    lib.toggle_category("asmr");
    assert_eq!(lib.visible(), vec![2]);

    lib.select_all();
    assert_eq!(lib.visible(), vec![0, 1, 2, 3]);
}

#[test]
fn filtering_never_changes_the_track_set() {
    let mut lib = library();
    let before = lib.tracks().to_vec();
    lib.set_query("zzz");
    lib.select_none();
    assert!(lib.visible().is_empty());
    assert_eq!(lib.tracks(), before.as_slice());
}

#[test]
fn restore_selection_ignores_unknown_categories() {
    let mut lib = library();
    lib.restore_selection(&["gone".to_owned()]);
    assert!(lib.is_selected("funny"));

    lib.restore_selection(&["asmr".to_owned(), "gone".to_owned()]);
    assert!(lib.is_selected("asmr"));
    assert!(!lib.is_selected("funny"));
}
