//! TOML configuration parsing and validation.
//!
//! Only `[catalog]` is required; every other section falls back to
//! defaults suitable for a local Ollama instance.
//!
//! ```toml
//! [catalog]
//! path = "./data/catalog.json"
//!
//! [completion]
//! provider = "ollama"          # disabled | ollama | openai
//! model = "llama3.2"
//! base_url = "http://localhost:11434"
//! timeout_secs = 30
//! max_retries = 0
//!
//! [search]
//! expansion_mode = "literal"   # literal | per_keyword
//! semantic_limit = 5
//!
//! [recommendations]
//! limit = 5
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use smartcart_core::recommend::DEFAULT_CATEGORIES;
use smartcart_core::relevance::DEFAULT_LIMIT;
use smartcart_core::ExpansionMode;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub recommendations: RecommendationsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// JSON file with `products` and `customers` arrays. Relative paths are
    /// resolved against the config file's directory.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl CompletionConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// Model name, falling back to the provider's usual default.
    pub fn model_or_default(&self) -> String {
        match (&self.model, self.provider.as_str()) {
            (Some(m), _) => m.clone(),
            (None, "openai") => "gpt-4o-mini".to_string(),
            (None, _) => "llama3.2".to_string(),
        }
    }

    /// Base URL, falling back to the provider's public endpoint.
    pub fn base_url_or_default(&self) -> String {
        let url = match (&self.base_url, self.provider.as_str()) {
            (Some(u), _) => u.clone(),
            (None, "openai") => "https://api.openai.com".to_string(),
            (None, _) => "http://localhost:11434".to_string(),
        };
        url.trim_end_matches('/').to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_expansion_mode")]
    pub expansion_mode: String,
    #[serde(default = "default_limit")]
    pub semantic_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            expansion_mode: default_expansion_mode(),
            semantic_limit: default_limit(),
        }
    }
}

impl SearchConfig {
    pub fn mode(&self) -> Result<ExpansionMode> {
        self.expansion_mode
            .parse()
            .map_err(|e: String| anyhow::anyhow!("search.expansion_mode: {}", e))
    }
}

fn default_expansion_mode() -> String {
    "literal".to_string()
}
fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationsConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            categories: default_categories(),
        }
    }
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.catalog.path.is_relative() {
        if let Some(dir) = path.parent() {
            config.catalog.path = dir.join(&config.catalog.path);
        }
    }

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    match config.completion.provider.as_str() {
        "disabled" | "ollama" | "openai" => {}
        other => anyhow::bail!(
            "Unknown completion provider: '{}'. Must be disabled, ollama, or openai.",
            other
        ),
    }

    if config.completion.is_enabled() && config.completion.timeout_secs == 0 {
        anyhow::bail!("completion.timeout_secs must be > 0");
    }

    config.search.mode()?;

    if config.search.semantic_limit < 1 {
        anyhow::bail!("search.semantic_limit must be >= 1");
    }

    if config.recommendations.limit < 1 {
        anyhow::bail!("recommendations.limit must be >= 1");
    }

    if config.recommendations.categories.is_empty() {
        anyhow::bail!("recommendations.categories must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("smartcart.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[catalog]\npath = \"catalog.json\"\n");
        let config = load_config(&path).unwrap();

        assert_eq!(config.catalog.path, dir.path().join("catalog.json"));
        assert_eq!(config.completion.provider, "ollama");
        assert_eq!(config.completion.model_or_default(), "llama3.2");
        assert_eq!(
            config.completion.base_url_or_default(),
            "http://localhost:11434"
        );
        assert_eq!(config.completion.timeout_secs, 30);
        assert_eq!(config.search.mode().unwrap(), ExpansionMode::Literal);
        assert_eq!(config.search.semantic_limit, 5);
        assert_eq!(config.recommendations.categories.len(), 8);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_absolute_catalog_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[catalog]\npath = \"/srv/catalog.json\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.catalog.path, PathBuf::from("/srv/catalog.json"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[catalog]\npath = \"c.json\"\n[completion]\nprovider = \"gemini\"\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Unknown completion provider"));
    }

    #[test]
    fn test_unknown_expansion_mode_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[catalog]\npath = \"c.json\"\n[search]\nexpansion_mode = \"fuzzy\"\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("expansion_mode"));
    }

    #[test]
    fn test_openai_defaults_and_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[catalog]\npath = \"c.json\"\n[completion]\nprovider = \"openai\"\nbase_url = \"http://proxy:9000/\"\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.completion.model_or_default(), "gpt-4o-mini");
        assert_eq!(config.completion.base_url_or_default(), "http://proxy:9000");
    }

    #[test]
    fn test_zero_limit_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[catalog]\npath = \"c.json\"\n[recommendations]\nlimit = 0\n",
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_shipped_example_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/smartcart.example.toml");
        let config = load_config(&path).unwrap();
        assert!(config.catalog.path.ends_with("data/catalog.example.json"));
        assert!(crate::catalog::load_catalog(&config.catalog.path).is_ok());
    }
}
