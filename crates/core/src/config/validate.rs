use super::{types::AppConfig, ConfigError};

/// Validate configuration
/// Currently validates:
/// - max_concurrent_downloads is not 0
/// - Source names are non-empty and unique
/// - Favorite-author lists contain no blank names
///
/// The pipeline builder additionally requires at least one enabled target;
/// that check lives there because targets can be injected directly.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_downloads == 0 {
        return Err(ConfigError::ValidationError(
            "max_concurrent_downloads cannot be 0".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for source in &config.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "source name cannot be empty".to_string(),
            ));
        }
        if !seen.insert(source.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate source name: {}",
                source.name
            )));
        }
        if let Some(authors) = &source.favorite_authors {
            if authors.authors.iter().any(|a| a.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "source {} has a blank favorite author",
                    source.name
                )));
            }
        }
    }

    Ok(())
}
