use gwasi_ratui::settings::{AppSettings, load_settings, save_settings};
use std::fs;

#[test]
fn settings_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path();

    let s = AppSettings {
        volume: 0.4,
        selected_categories: vec!["asmr".to_owned(), "funny".to_owned()],
        http_timeout_secs: 12,
        http_connect_timeout_secs: 3,
    };
    save_settings(data_dir, &s).expect("save_settings");

    let loaded = load_settings(data_dir);
    assert!((loaded.volume - 0.4).abs() < f32::EPSILON);
    assert_eq!(loaded.selected_categories, vec!["asmr", "funny"]);
    assert_eq!(loaded.http_timeout_secs, 12);
    assert_eq!(loaded.http_connect_timeout_secs, 3);
}

#[test]
fn settings_corrupt_file_falls_back_to_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path();
    fs::write(data_dir.join("settings.json"), b"{not-json").expect("write");

    let loaded = load_settings(data_dir);
    assert!((loaded.volume - AppSettings::default().volume).abs() < f32::EPSILON);
    assert!(loaded.selected_categories.is_empty());
}

#[test]
fn settings_missing_fields_use_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path();
    fs::write(data_dir.join("settings.json"), br#"{"volume":1.5}"#).expect("write");

    let loaded = load_settings(data_dir);
    assert!((loaded.volume - 1.5).abs() < f32::EPSILON);
    assert_eq!(
        loaded.http_timeout_secs,
        AppSettings::default().http_timeout_secs
    );
}
