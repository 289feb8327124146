use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub volume: f32,
    /// 上次退出时启用的分类；为空时使用“出现次数最多的分类”
    pub selected_categories: Vec<String>,
    pub http_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            selected_categories: Vec::new(),
            http_timeout_secs: 30,
            http_connect_timeout_secs: 10,
        }
    }
}

pub fn load_settings(data_dir: &Path) -> AppSettings {
    let p = settings_path(data_dir);
    let Ok(bytes) = fs::read(&p) else {
        return AppSettings::default();
    };
    match serde_json::from_slice(&bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %p.display(), err = %e, "设置文件损坏，使用默认设置");
            AppSettings::default()
        }
    }
}

pub fn save_settings(data_dir: &Path, s: &AppSettings) -> Result<(), SettingsError> {
    fs::create_dir_all(data_dir).map_err(|source| SettingsError::Save { source })?;
    let p = settings_path(data_dir);
    let tmp = p.with_extension("json.tmp");
    let bytes =
        serde_json::to_vec_pretty(s).map_err(|source| SettingsError::Serialize { source })?;
    fs::write(&tmp, bytes).map_err(|source| SettingsError::Save { source })?;
    if let Err(e) = fs::rename(&tmp, &p) {
        let _ = fs::remove_file(&p);
        fs::rename(&tmp, &p).map_err(|_| SettingsError::Save { source: e })?;
    }
    Ok(())
}

fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}
