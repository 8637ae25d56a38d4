//! Configuration loading and management

use super::schema::Config;
use super::validate::validate_config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_PREFIX: &str = "CHATLITE__";

/// Configuration loader
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".chatlite"))
            .unwrap_or_else(|| PathBuf::from(".chatlite"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_path();
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content)?;
            merge_values(&mut merged, file_value);
        }

        apply_alias_overrides(&mut merged);
        apply_path_overrides(&mut merged);

        let config: Config = serde_json::from_value(merged)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlay `overlay` onto `base`; objects merge key by key, anything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    let Value::Object(overlay_map) = overlay else {
        *base = overlay;
        return;
    };
    let Some(base_map) = base.as_object_mut() else {
        *base = Value::Object(overlay_map);
        return;
    };
    for (key, value) in overlay_map {
        match base_map.get_mut(&key) {
            Some(slot) => merge_values(slot, value),
            None => {
                base_map.insert(key, value);
            }
        }
    }
}

/// Env values are JSON when they parse as JSON, case-insensitive booleans,
/// and plain strings otherwise
fn parse_env_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| match raw.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    })
}

fn set_path_value(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(last.clone(), value);
    }
}

fn apply_alias_overrides(config: &mut Value) {
    let aliases = [("CHATLITE_API_BASE", "remote.base_url")];

    for (env_key, target_path) in aliases {
        if let Ok(value) = std::env::var(env_key) {
            let path: Vec<String> = target_path.split('.').map(ToString::to_string).collect();
            set_path_value(config, &path, Value::String(value));
        }
    }
}

fn apply_path_overrides(config: &mut Value) {
    for (key, value) in std::env::vars() {
        let Some(suffix) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let segments: Vec<String> = suffix
            .split("__")
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .collect();
        if segments.is_empty() {
            continue;
        }
        set_path_value(config, &segments, parse_env_value(&value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaleResponsePolicy;
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    struct EnvVarGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &str, value: &str) -> Self {
            let original = std::env::var(key).ok();
            std::env::set_var(key, value);
            Self {
                key: key.to_string(),
                original,
            }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.original {
                std::env::set_var(&self.key, value);
            } else {
                std::env::remove_var(&self.key);
            }
        }
    }

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_load_default_config() {
        let _lock = lock_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.remote.base_url, "http://localhost:5000/api");
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.engine.label_max_chars, 30);
        assert!(config.engine.sync_sessions_on_create);
        assert_eq!(config.engine.stale_responses, StaleResponsePolicy::Apply);
    }

    #[test]
    fn test_save_and_load_config() {
        let _lock = lock_env();
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());

        let mut config = Config::default();
        config.remote.base_url = "https://chat.example.com/api".to_string();
        config.engine.stale_responses = StaleResponsePolicy::Discard;

        loader.save(&config).unwrap();
        let loaded = loader.load().unwrap();

        assert_eq!(loaded.remote.base_url, "https://chat.example.com/api");
        assert_eq!(loaded.engine.stale_responses, StaleResponsePolicy::Discard);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let _lock = lock_env();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.json"),
            r#"{"remote":{"timeout_secs":5}}"#,
        )
        .unwrap();

        let config = ConfigLoader::with_dir(temp_dir.path()).load().unwrap();
        assert_eq!(config.remote.timeout_secs, 5);
        assert_eq!(config.remote.base_url, "http://localhost:5000/api");
    }

    #[test]
    fn test_load_applies_alias_env_override() {
        let _lock = lock_env();
        let _guard = EnvVarGuard::set("CHATLITE_API_BASE", "http://10.0.0.2:5000/api");

        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::with_dir(temp_dir.path()).load().unwrap();

        assert_eq!(config.remote.base_url, "http://10.0.0.2:5000/api");
    }

    #[test]
    fn test_load_applies_path_env_overrides() {
        let _lock = lock_env();
        let _timeout = EnvVarGuard::set("CHATLITE__REMOTE__TIMEOUT_SECS", "12");
        let _sync = EnvVarGuard::set("CHATLITE__ENGINE__SYNC_SESSIONS_ON_CREATE", "false");
        let _policy = EnvVarGuard::set("CHATLITE__ENGINE__STALE_RESPONSES", "discard");
        let _level = EnvVarGuard::set("CHATLITE__LOGGING__LEVEL", "debug");

        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::with_dir(temp_dir.path()).load().unwrap();

        assert_eq!(config.remote.timeout_secs, 12);
        assert!(!config.engine.sync_sessions_on_create);
        assert_eq!(config.engine.stale_responses, StaleResponsePolicy::Discard);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_path_env_overrides_alias_and_file() {
        let _lock = lock_env();
        let _alias = EnvVarGuard::set("CHATLITE_API_BASE", "http://alias/api");
        let _path = EnvVarGuard::set("CHATLITE__REMOTE__BASE_URL", "http://path/api");

        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.json"),
            r#"{"remote":{"base_url":"http://file/api"}}"#,
        )
        .unwrap();

        let config = ConfigLoader::with_dir(temp_dir.path()).load().unwrap();
        assert_eq!(config.remote.base_url, "http://path/api");
    }

    #[test]
    fn test_env_values_parse_json_booleans_and_strings() {
        assert_eq!(parse_env_value("12"), Value::from(12));
        assert_eq!(parse_env_value("TRUE"), Value::Bool(true));
        assert_eq!(parse_env_value("False"), Value::Bool(false));
        assert_eq!(parse_env_value("discard"), Value::from("discard"));
        assert_eq!(parse_env_value(r#"{"a":1}"#), serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_merge_keeps_unrelated_keys() {
        let mut base = serde_json::json!({"remote": {"base_url": "a", "timeout_secs": 30}, "x": 1});
        merge_values(&mut base, serde_json::json!({"remote": {"base_url": "b"}, "x": {"y": 2}}));
        assert_eq!(
            base,
            serde_json::json!({"remote": {"base_url": "b", "timeout_secs": 30}, "x": {"y": 2}})
        );
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let _lock = lock_env();
        let _guard = EnvVarGuard::set("CHATLITE__REMOTE__TIMEOUT_SECS", "0");

        let temp_dir = TempDir::new().unwrap();
        let err = ConfigLoader::with_dir(temp_dir.path()).load().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
