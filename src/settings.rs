use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RemitError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub export_dir: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Raw JSON object; validated by `VendorMap::from_value` on use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_mapping: Option<Value>,
}

fn default_currency() -> String {
    "KES".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir().to_string_lossy().to_string(),
            currency: default_currency(),
            vendor_mapping: None,
        }
    }
}

fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("REMIT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("remit")
}

const SETTINGS_FILE: &str = "settings.json";

fn settings_path() -> PathBuf {
    config_dir().join(SETTINGS_FILE)
}

fn default_export_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("remit")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_in(&config_dir(), settings)
}

fn save_settings_in(dir: &Path, settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| RemitError::Settings(e.to_string()))?;
    std::fs::write(dir.join(SETTINGS_FILE), format!("{json}\n"))?;
    Ok(())
}

pub fn get_export_dir() -> PathBuf {
    PathBuf::from(shellexpand_path(&load_settings().export_dir))
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settings {
        Settings {
            export_dir: "/tmp/test".to_string(),
            currency: "USD".to_string(),
            vendor_mapping: Some(serde_json::json!({"254499": "Vendlite"})),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("config").join("remit");
        save_settings_in(&nested, &sample()).unwrap();
        let loaded = load_settings_from(&nested.join(SETTINGS_FILE));
        assert_eq!(loaded.export_dir, "/tmp/test");
        assert_eq!(loaded.currency, "USD");
        assert_eq!(loaded.vendor_mapping, sample().vendor_mapping);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_settings_from(&dir.path().join(SETTINGS_FILE));
        assert_eq!(loaded.currency, "KES");
        assert!(loaded.vendor_mapping.is_none());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{not json").unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.currency, "KES");
        assert!(loaded.vendor_mapping.is_none());
    }

    // The only test that touches REMIT_CONFIG_DIR.
    #[test]
    fn test_public_functions_use_config_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("REMIT_CONFIG_DIR", dir.path());
        save_settings(&sample()).unwrap();
        assert!(dir.path().join(SETTINGS_FILE).exists());
        assert_eq!(load_settings().currency, "USD");
        assert_eq!(get_export_dir(), PathBuf::from("/tmp/test"));
        std::env::remove_var("REMIT_CONFIG_DIR");
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.currency, "KES");
        assert!(s.vendor_mapping.is_none());
        assert!(s.export_dir.ends_with("remit"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"export_dir": "/tmp/out"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.currency, "KES");
        assert!(s.vendor_mapping.is_none());
    }

    #[test]
    fn test_mapping_omitted_when_unset() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(!json.contains("vendor_mapping"));
    }

    #[test]
    fn test_shellexpand_leaves_plain_paths() {
        assert_eq!(shellexpand_path("/var/data"), "/var/data");
    }
}
