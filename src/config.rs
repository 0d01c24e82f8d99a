use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
    #[serde(default = "default_project_id")]
    pub project_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            project_id: default_project_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_project_id() -> String {
    "default".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexingConfig {
    /// Number of files uploaded concurrently per batch. Batches run
    /// sequentially; this is the only concurrency knob.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Additional exclusion globs, matched against paths relative to the
    /// indexing root (e.g. `"**/*.lock"`).
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            exclude_globs: Vec::new(),
        }
    }
}

fn default_batch_size() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_search_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Deployment profile: `local`, `tei`, `openai`, or `production`.
    #[serde(default = "default_deployment")]
    pub deployment: String,
    /// Directory holding the docker-compose files. Defaults to `./docker`.
    #[serde(default = "default_compose_dir")]
    pub compose_dir: String,
    /// Health poll attempts after `server start`.
    #[serde(default = "default_health_retries")]
    pub health_retries: u32,
    /// Seconds between health poll attempts.
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            deployment: default_deployment(),
            compose_dir: default_compose_dir(),
            health_retries: default_health_retries(),
            health_interval_secs: default_health_interval_secs(),
        }
    }
}

fn default_deployment() -> String {
    "local".to_string()
}
fn default_compose_dir() -> String {
    "./docker".to_string()
}
fn default_health_retries() -> u32 {
    30
}
fn default_health_interval_secs() -> u64 {
    10
}

/// Load configuration from a TOML file.
///
/// A missing file is not an error: every setting has a default, so the
/// toolkit works against `http://localhost:8000` out of the box.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.indexing.batch_size == 0 {
        anyhow::bail!("indexing.batch_size must be > 0");
    }

    if config.search.limit == 0 {
        anyhow::bail!("search.limit must be > 0");
    }

    if config.api.url.trim_end_matches('/').is_empty() {
        anyhow::bail!("api.url must not be empty");
    }

    match config.server.deployment.as_str() {
        "local" | "tei" | "openai" | "production" => {}
        other => anyhow::bail!(
            "Unknown deployment profile: '{}'. Must be local, tei, openai, or production.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(&PathBuf::from("/nonexistent/rag.toml")).unwrap();
        assert_eq!(config.api.url, "http://localhost:8000");
        assert_eq!(config.api.project_id, "default");
        assert_eq!(config.indexing.batch_size, 10);
        assert_eq!(config.search.limit, 5);
        assert_eq!(config.server.deployment, "local");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rag.toml");
        std::fs::write(
            &path,
            r#"
[api]
url = "http://rag.internal:9000"
project_id = "acme"

[indexing]
batch_size = 4
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.url, "http://rag.internal:9000");
        assert_eq!(config.api.project_id, "acme");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.indexing.batch_size, 4);
        assert_eq!(config.search.limit, 5);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rag.toml");
        std::fs::write(&path, "[indexing]\nbatch_size = 0\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_unknown_deployment_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rag.toml");
        std::fs::write(&path, "[server]\ndeployment = \"staging\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
