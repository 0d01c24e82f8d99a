//! HTTP client for the remote retrieval service.
//!
//! Wraps the service's ingestion, query, stats, and health endpoints. Any
//! 2xx response counts as success; everything else — including transport
//! errors — is a failure for that call. The client never retries: per-item
//! upload failures are isolated by the batcher, and a hung upload is bounded
//! only by the client-wide timeout.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::models::{FileMetadata, SearchMode, SearchResult};

pub struct RagClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl RagClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api.url.trim_end_matches('/').to_string(),
            project_id: config.api.project_id.clone(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Upload a single file to the ingestion endpoint.
    ///
    /// Reads the file fully into memory and sends it as a multipart form with
    /// a stable file id, the owning project id, and a JSON metadata envelope.
    pub async fn upload_document(&self, path: &Path, metadata: &FileMetadata) -> Result<()> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        let envelope = serde_json::json!({
            "source": metadata.path.display().to_string(),
            "file_type": metadata.category.as_str(),
            "language": metadata.language,
            "size": metadata.size,
            "last_modified": metadata.last_modified.timestamp(),
            "project_id": metadata.project_id,
        });

        let form = reqwest::multipart::Form::new()
            .text("file_id", file_id(path))
            .text("project_id", self.project_id.clone())
            .text("metadata", envelope.to_string())
            .part(
                "file",
                reqwest::multipart::Part::bytes(content).file_name(filename),
            );

        let response = self
            .http
            .post(format!("{}/documents", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Upload rejected ({}): {}", status, body);
        }

        Ok(())
    }

    /// Search indexed documents.
    ///
    /// The service has no dedicated hybrid endpoint, so `Hybrid` is sent as a
    /// semantic query.
    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        limit: usize,
        file_types: &[String],
        languages: &[String],
    ) -> Result<Vec<SearchResult>> {
        let effective_mode = match mode {
            SearchMode::Semantic | SearchMode::Hybrid => "semantic",
        };

        let mut filters = serde_json::Map::new();
        if !file_types.is_empty() {
            filters.insert("file_types".to_string(), serde_json::json!(file_types));
        }
        if !languages.is_empty() {
            filters.insert("languages".to_string(), serde_json::json!(languages));
        }

        let body = serde_json::json!({
            "query": query,
            "project_id": self.project_id,
            "limit": limit,
            "mode": effective_mode,
            "filters": filters,
        });

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Search failed ({}): {}", status, body);
        }

        let json: serde_json::Value = response.json().await?;
        parse_results(json)
    }

    /// Find documents similar to a reference file.
    pub async fn find_similar(&self, file_path: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let body = serde_json::json!({
            "file_path": file_path,
            "limit": limit,
            "project_id": self.project_id,
        });

        let response = self
            .http
            .post(format!("{}/search/similar", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Similarity search failed ({}): {}", status, body);
        }

        let json: serde_json::Value = response.json().await?;
        parse_results(json)
    }

    /// Fetch server-side statistics for this project.
    pub async fn get_stats(&self) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(format!(
                "{}/projects/{}/stats",
                self.base_url, self.project_id
            ))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("Failed to get project stats ({})", status);
        }

        Ok(response.json().await?)
    }

    /// Check whether the retrieval service is reachable and healthy.
    ///
    /// Returns `false` for any non-2xx status, timeout, or connection error;
    /// never returns an error to the caller.
    pub async fn health(&self) -> bool {
        match self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Stable file id: a short content-independent hash of the path, plus the
/// filename with dots flattened so the id is safe in URLs and object keys.
fn file_id(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().replace('.', "_"))
        .unwrap_or_else(|| "unnamed".to_string());

    format!("{}_{}", &digest[..10], name)
}

/// One record in the query response: either a bare document or a
/// `[document, score]` pair. The service returns both shapes depending on
/// the endpoint, so the consumer must handle both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseItem {
    Scored(ResponseDoc, f64),
    Bare(ResponseDoc),
}

#[derive(Debug, Deserialize)]
struct ResponseDoc {
    #[serde(default)]
    page_content: String,
    #[serde(default)]
    metadata: ResponseDocMetadata,
}

#[derive(Debug, Deserialize, Default)]
struct ResponseDocMetadata {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    file_type: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

fn parse_results(json: serde_json::Value) -> Result<Vec<SearchResult>> {
    let items: Vec<ResponseItem> =
        serde_json::from_value(json).context("Invalid search response shape")?;

    let results = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let (doc, score) = match item {
                ResponseItem::Scored(doc, score) => (doc, Some(score)),
                ResponseItem::Bare(doc) => (doc, None),
            };
            SearchResult {
                rank: i + 1,
                source: doc
                    .metadata
                    .source
                    .unwrap_or_else(|| "unknown".to_string()),
                excerpt: doc.page_content,
                score,
                file_type: doc.metadata.file_type,
                language: doc.metadata.language,
            }
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::{Read, Write};

    #[test]
    fn test_parse_bare_documents() {
        let json = serde_json::json!([
            {"page_content": "fn main() {}", "metadata": {"source": "src/main.rs", "file_type": "code", "language": "rust"}},
            {"page_content": "# Readme", "metadata": {"source": "README.md"}}
        ]);
        let results = parse_results(json).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[0].source, "src/main.rs");
        assert_eq!(results[0].score, None);
        assert_eq!(results[1].rank, 2);
        assert_eq!(results[1].file_type, None);
    }

    #[test]
    fn test_parse_scored_pairs() {
        let json = serde_json::json!([
            [{"page_content": "auth flow", "metadata": {"source": "docs/auth.md", "file_type": "documentation"}}, 0.92],
            [{"page_content": "login()", "metadata": {"source": "src/login.py", "language": "python"}}, 0.71]
        ]);
        let results = parse_results(json).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, Some(0.92));
        assert_eq!(results[1].source, "src/login.py");
    }

    #[test]
    fn test_parse_mixed_shapes() {
        let json = serde_json::json!([
            [{"page_content": "a", "metadata": {"source": "a.md"}}, 0.5],
            {"page_content": "b", "metadata": {"source": "b.md"}}
        ]);
        let results = parse_results(json).unwrap();
        assert_eq!(results[0].score, Some(0.5));
        assert_eq!(results[1].score, None);
    }

    #[test]
    fn test_parse_missing_metadata_defaults() {
        let json = serde_json::json!([{"page_content": "orphan"}]);
        let results = parse_results(json).unwrap();
        assert_eq!(results[0].source, "unknown");
    }

    #[test]
    fn test_file_id_stable_and_name_flattened() {
        let a = file_id(Path::new("src/main.py"));
        let b = file_id(Path::new("src/main.py"));
        assert_eq!(a, b);
        assert!(a.ends_with("_main_py"));
        assert_ne!(a, file_id(Path::new("lib/main.py")));
    }

    fn config_for(url: &str) -> Config {
        let mut config = Config::default();
        config.api.url = url.to_string();
        config.api.timeout_secs = 2;
        config
    }

    /// Accept one connection and answer with a canned HTTP response.
    fn one_shot_server(response: &'static str) -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_ok_on_200() {
        let url = one_shot_server("HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok");
        let client = RagClient::new(&config_for(&url)).unwrap();
        assert!(client.health().await);
    }

    #[tokio::test]
    async fn test_health_false_on_503() {
        let url = one_shot_server("HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\n\r\n");
        let client = RagClient::new(&config_for(&url)).unwrap();
        assert!(!client.health().await);
    }

    #[tokio::test]
    async fn test_health_false_on_connection_error_without_panicking() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RagClient::new(&config_for(&format!("http://{}", addr))).unwrap();
        assert!(!client.health().await);
    }
}
