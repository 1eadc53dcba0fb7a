use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::limitless::bool_param;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub query: QueryDefaults,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.limitless.ai/v1".to_string(),
        }
    }
}

/// Base query parameters sent with every lifelog request. Tool
/// arguments of the same name take precedence over these.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct QueryDefaults {
    pub timezone: Option<String>,
    pub direction: Option<String>,
    pub include_markdown: Option<bool>,
    pub include_headings: Option<bool>,
}

impl QueryDefaults {
    /// Wire-format pairs for the configured defaults, in config order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(timezone) = &self.timezone {
            pairs.push(("timezone".to_string(), timezone.clone()));
        }
        if let Some(direction) = &self.direction {
            pairs.push(("direction".to_string(), direction.clone()));
        }
        if let Some(include_markdown) = self.include_markdown {
            pairs.push(("includeMarkdown".to_string(), bool_param(include_markdown)));
        }
        if let Some(include_headings) = self.include_headings {
            pairs.push(("includeHeadings".to_string(), bool_param(include_headings)));
        }

        pairs
    }
}

impl Config {
    /// Load configuration from TOML file. Every key is optional and a
    /// missing file just means defaults, so the server runs with no
    /// config at all.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            log::info!("{} not found, using default configuration", path.display());
            Config::default()
        };

        // Override with environment variable if set
        if let Ok(url) = std::env::var("LIMITLESS_API_URL") {
            config.api.base_url = url;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
            [api]
            base_url = "https://api.example.test/v1"

            [query]
            timezone = "Asia/Tokyo"
            direction = "desc"
            include_markdown = true
            include_headings = false
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.test/v1");
        assert_eq!(config.query.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(config.query.include_headings, Some(false));
    }

    #[test]
    fn test_empty_config_falls_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "https://api.limitless.ai/v1");
        assert!(config.query.to_pairs().is_empty());
    }

    #[test]
    fn test_partial_query_section() {
        let config: Config = toml::from_str("[query]\ntimezone = \"UTC\"\n").unwrap();
        assert_eq!(
            config.query.to_pairs(),
            vec![("timezone".to_string(), "UTC".to_string())]
        );
    }

    #[test]
    fn test_query_pairs_use_wire_names() {
        let config: Config = toml::from_str(
            "[query]\ninclude_markdown = true\ninclude_headings = true\n",
        )
        .unwrap();
        let pairs = config.query.to_pairs();
        assert!(pairs.contains(&("includeMarkdown".to_string(), "true".to_string())));
        assert!(pairs.contains(&("includeHeadings".to_string(), "true".to_string())));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        std::env::remove_var("LIMITLESS_API_URL");
        let config = Config::from_file("definitely-missing-config.toml").unwrap();
        assert_eq!(config.api.base_url, "https://api.limitless.ai/v1");
    }
}
