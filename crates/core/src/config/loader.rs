use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::AppConfig, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: AppConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("MAPSYNC_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
max_concurrent_downloads = 6

[[targets]]
path = "/data/content"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.max_concurrent_downloads, 6);
        assert_eq!(config.targets.len(), 1);
    }

    #[test]
    fn test_load_config_from_str_invalid() {
        let result = load_config_from_str("max_concurrent_downloads = \"many\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
temp_dir = "/tmp/mapsync"

[[targets]]
path = "/data/content"
history_path = "/data/history.json"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.temp_dir.to_str().unwrap(), "/tmp/mapsync");
        assert!(config.targets[0].history_path.is_some());
    }
}
