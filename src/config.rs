//! Runtime settings: data locations, registry source, capability flags.
//!
//! Resolution order (later wins): built-in defaults, environment (including a
//! `.env` file picked up by `dotenvy`), CLI flags.

use std::path::{Path, PathBuf};

const DEFAULT_RAW_DIR: &str = "data_raw";
const DEFAULT_PROCESSED_DIR: &str = "data_processed";
const CATALOG_FILE_NAME: &str = "indicators_meta.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub catalog_path: PathBuf,
    /// JSON registry file; `None` selects the built-in indicator table.
    pub registry_path: Option<PathBuf>,
    /// Whether the text-generation collaborator can be offered (API key present).
    pub ai_enabled: bool,
}

/// Path overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub raw_dir: Option<PathBuf>,
    pub processed_dir: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub registry_path: Option<PathBuf>,
}

impl Settings {
    /// Settings rooted at `root`, with the AI collaborator disabled.
    pub fn rooted_at(root: &Path) -> Self {
        let processed_dir = root.join(DEFAULT_PROCESSED_DIR);
        Self {
            raw_dir: root.join(DEFAULT_RAW_DIR),
            catalog_path: processed_dir.join(CATALOG_FILE_NAME),
            processed_dir,
            registry_path: None,
            ai_enabled: false,
        }
    }

    pub fn from_env(overrides: SettingsOverrides) -> Self {
        dotenvy::dotenv().ok();
        Self::resolve(|key| std::env::var(key).ok(), overrides)
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>, overrides: SettingsOverrides) -> Self {
        let env_path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        let raw_dir = overrides
            .raw_dir
            .or_else(|| env_path("MTM_RAW_DIR"))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RAW_DIR));
        let processed_dir = overrides
            .processed_dir
            .or_else(|| env_path("MTM_PROCESSED_DIR"))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROCESSED_DIR));
        // The catalog follows the processed directory unless placed explicitly.
        let catalog_path = overrides
            .catalog_path
            .or_else(|| env_path("MTM_CATALOG_PATH"))
            .unwrap_or_else(|| processed_dir.join(CATALOG_FILE_NAME));
        let registry_path = overrides.registry_path.or_else(|| env_path("MTM_REGISTRY"));

        let ai_enabled = lookup("GEMINI_API_KEY").is_some_and(|k| !k.trim().is_empty());

        Self {
            raw_dir,
            processed_dir,
            catalog_path,
            registry_path,
            ai_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let s = Settings::resolve(env(&[]), SettingsOverrides::default());
        assert_eq!(s.raw_dir, PathBuf::from("data_raw"));
        assert_eq!(s.catalog_path, PathBuf::from("data_processed/indicators_meta.csv"));
        assert_eq!(s.registry_path, None);
        assert!(!s.ai_enabled);
    }

    #[test]
    fn cli_overrides_beat_environment() {
        let s = Settings::resolve(
            env(&[("MTM_RAW_DIR", "/env/raw"), ("MTM_PROCESSED_DIR", "/env/out"), ("GEMINI_API_KEY", "k")]),
            SettingsOverrides {
                raw_dir: Some(PathBuf::from("/cli/raw")),
                ..Default::default()
            },
        );
        assert_eq!(s.raw_dir, PathBuf::from("/cli/raw"));
        assert_eq!(s.processed_dir, PathBuf::from("/env/out"));
        assert_eq!(s.catalog_path, PathBuf::from("/env/out/indicators_meta.csv"));
        assert!(s.ai_enabled);
    }

    #[test]
    fn blank_api_key_disables_ai() {
        let s = Settings::resolve(env(&[("GEMINI_API_KEY", "  ")]), SettingsOverrides::default());
        assert!(!s.ai_enabled);
    }
}
