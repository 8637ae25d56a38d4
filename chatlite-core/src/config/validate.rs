//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    let base_url = config.remote.base_url.trim();
    if base_url.is_empty() {
        errors.push("remote.base_url must not be empty".to_string());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push("remote.base_url must start with http:// or https://".to_string());
    }
    if config.remote.timeout_secs == 0 {
        errors.push("remote.timeout_secs must be > 0".to_string());
    }

    if config.engine.label_max_chars == 0 {
        errors.push("engine.label_max_chars must be > 0".to_string());
    }

    let format = config.logging.format.to_lowercase();
    if format != "text" && format != "json" {
        errors.push(format!(
            "logging.format must be one of text, json (got {})",
            config.logging.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_defaults() {
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.remote.base_url = "localhost:5000".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("remote.base_url"));
    }

    #[test]
    fn test_validate_aggregates_errors() {
        let mut config = Config::default();
        config.remote.timeout_secs = 0;
        config.engine.label_max_chars = 0;
        config.logging.format = "yaml".to_string();

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("remote.timeout_secs"));
        assert!(err.contains("engine.label_max_chars"));
        assert!(err.contains("logging.format"));
    }
}
