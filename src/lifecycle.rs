//! Backing-service lifecycle management.
//!
//! Drives `docker compose` for the RAG deployment: start, stop, restart,
//! status, logs, health, and a validation probe. The toolkit treats the
//! orchestrator as an external collaborator — only the health endpoint and
//! the compose CLI are consumed, never orchestration internals.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::client::RagClient;
use crate::config::Config;

/// Timeout for any single spawned compose/docker command.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Closed set of supported deployment profiles, each mapped to a compose file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentProfile {
    /// Self-hosted embeddings (Ollama) alongside the API.
    Local,
    /// External text-embeddings-inference service.
    Tei,
    /// Hosted OpenAI embeddings.
    Openai,
    Production,
}

impl DeploymentProfile {
    pub fn compose_file(&self) -> &'static str {
        match self {
            DeploymentProfile::Local => "docker-compose.local.yml",
            DeploymentProfile::Tei => "docker-compose.tei.yml",
            DeploymentProfile::Openai => "docker-compose.openai.yml",
            DeploymentProfile::Production => "docker-compose.production.yml",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentProfile::Local => "local",
            DeploymentProfile::Tei => "tei",
            DeploymentProfile::Openai => "openai",
            DeploymentProfile::Production => "production",
        }
    }
}

impl FromStr for DeploymentProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(DeploymentProfile::Local),
            "tei" => Ok(DeploymentProfile::Tei),
            "openai" => Ok(DeploymentProfile::Openai),
            "production" => Ok(DeploymentProfile::Production),
            other => bail!(
                "Unknown deployment profile: '{}'. Must be local, tei, openai, or production.",
                other
            ),
        }
    }
}

/// One service row from `docker compose ps`.
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeService {
    #[serde(rename = "Service")]
    pub service: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Health", default)]
    pub health: Option<String>,
}

pub struct ServerManager<'a> {
    config: &'a Config,
    profile: DeploymentProfile,
    compose_dir: PathBuf,
}

impl<'a> ServerManager<'a> {
    pub fn new(config: &'a Config, deployment: Option<&str>) -> Result<Self> {
        let profile = deployment
            .unwrap_or(&config.server.deployment)
            .parse::<DeploymentProfile>()?;

        Ok(Self {
            config,
            profile,
            compose_dir: find_compose_dir(&config.server.compose_dir),
        })
    }

    fn compose_path(&self) -> PathBuf {
        self.compose_dir.join(self.profile.compose_file())
    }

    async fn run_command(&self, program: &str, args: &[&str]) -> Result<(bool, String, String)> {
        let mut command = tokio::process::Command::new(program);
        command.args(args);
        if self.compose_dir.is_dir() {
            command.current_dir(&self.compose_dir);
        }

        let output = tokio::time::timeout(COMMAND_TIMEOUT, command.output())
            .await
            .map_err(|_| {
                anyhow::anyhow!("Command timed out after 5 minutes: {} {:?}", program, args)
            })?
            .with_context(|| format!("Failed to run {}", program))?;

        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        ))
    }

    async fn compose(&self, args: &[&str]) -> Result<(bool, String, String)> {
        let compose_file = self.profile.compose_file();
        let mut full_args = vec!["compose", "-f", compose_file];
        full_args.extend_from_slice(args);
        self.run_command("docker", &full_args).await
    }

    /// Verify docker, docker compose, and the compose file are available.
    pub async fn check_prerequisites(&self) -> Result<()> {
        let (ok, _, _) = self.run_command("docker", &["--version"]).await?;
        if !ok {
            bail!("Docker is not available");
        }

        let (ok, _, _) = self.run_command("docker", &["compose", "version"]).await?;
        if !ok {
            bail!("Docker Compose is not available");
        }

        if !self.compose_dir.is_dir() {
            bail!("Compose directory not found: {}", self.compose_dir.display());
        }

        let compose_path = self.compose_path();
        if !compose_path.is_file() {
            bail!("Compose file not found: {}", compose_path.display());
        }

        Ok(())
    }

    /// Start the deployment and poll the health endpoint until it comes up.
    pub async fn start(&self) -> Result<()> {
        self.check_prerequisites().await?;

        println!("Starting RAG service ({})...", self.profile.as_str());
        let (ok, _, stderr) = self.compose(&["up", "-d"]).await?;
        if !ok {
            bail!("Failed to start services: {}", stderr.trim());
        }

        let client = RagClient::new(self.config)?;
        let retries = self.config.server.health_retries;
        let interval = Duration::from_secs(self.config.server.health_interval_secs);

        for attempt in 1..=retries {
            if client.health().await {
                println!("RAG service started successfully.");
                println!("API URL: {}", self.config.api.url);
                return Ok(());
            }
            eprintln!("waiting for service... (attempt {}/{})", attempt, retries);
            tokio::time::sleep(interval).await;
        }

        bail!("RAG service failed to become healthy within the startup timeout")
    }

    pub async fn stop(&self) -> Result<()> {
        println!("Stopping RAG service...");
        let (ok, _, stderr) = self.compose(&["down"]).await?;
        if !ok {
            bail!("Failed to stop services: {}", stderr.trim());
        }
        println!("RAG service stopped.");
        Ok(())
    }

    pub async fn restart(&self) -> Result<()> {
        self.stop().await?;
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.start().await
    }

    /// Print deployment status: compose services plus API health.
    pub async fn status(&self, json: bool) -> Result<()> {
        let (ok, stdout, _) = self.compose(&["ps", "--format", "json"]).await?;
        let services = if ok {
            parse_ps_output(&stdout)
        } else {
            Vec::new()
        };

        let client = RagClient::new(self.config)?;
        let api_healthy = client.health().await;

        if json {
            let obj = serde_json::json!({
                "deployment": self.profile.as_str(),
                "api_healthy": api_healthy,
                "services": services.iter().map(|s| serde_json::json!({
                    "service": s.service,
                    "state": s.state,
                    "health": s.health,
                })).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
            return Ok(());
        }

        println!("RAG service status");
        println!("==================");
        println!("Deployment: {}", self.profile.as_str());
        println!("API health: {}", if api_healthy { "healthy" } else { "unhealthy" });
        println!();

        if services.is_empty() {
            println!("No compose services running.");
        } else {
            println!("{:<24} {:<12} {}", "SERVICE", "STATE", "HEALTH");
            for s in &services {
                println!(
                    "{:<24} {:<12} {}",
                    s.service,
                    s.state,
                    s.health.as_deref().unwrap_or("unknown")
                );
            }
        }

        Ok(())
    }

    /// Print the last `tail` log lines, optionally for a single service.
    pub async fn logs(&self, service: Option<&str>, tail: u32) -> Result<()> {
        let tail = tail.to_string();
        let mut args = vec!["logs", "--tail", tail.as_str()];
        if let Some(service) = service {
            args.push(service);
        }

        let (ok, stdout, stderr) = self.compose(&args).await?;
        if !ok {
            bail!("Error getting logs: {}", stderr.trim());
        }
        print!("{}", stdout);
        Ok(())
    }

    /// Check the API health endpoint and report it. Unhealthy is a non-zero
    /// exit so scripts can gate on it.
    pub async fn health(&self, json: bool) -> Result<()> {
        let client = RagClient::new(self.config)?;
        let healthy = client.health().await;

        if json {
            println!("{}", serde_json::json!({ "healthy": healthy }));
        } else {
            println!("{}", if healthy { "healthy" } else { "unhealthy" });
        }

        if !healthy {
            bail!("RAG service is unhealthy");
        }
        Ok(())
    }

    /// Validate the whole setup: prerequisites, health, and a round-trip
    /// upload + query probe against the live API.
    pub async fn validate(&self) -> Result<()> {
        self.check_prerequisites().await?;

        let client = RagClient::new(self.config)?;
        if !client.health().await {
            bail!("Health check failed — is the service running?");
        }

        self.probe_roundtrip().await?;

        println!("RAG setup validation completed successfully.");
        Ok(())
    }

    /// Upload a small test document and run a query against it.
    ///
    /// A 404 from the query endpoint is tolerated — the probe only proves the
    /// endpoints exist and accept well-formed requests.
    async fn probe_roundtrip(&self) -> Result<()> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.api.timeout_secs))
            .build()?;
        let base_url = self.config.api.url.trim_end_matches('/');

        let form = reqwest::multipart::Form::new()
            .text("file_id", "validation_probe")
            .text("project_id", "validation_probe")
            .part(
                "file",
                reqwest::multipart::Part::text("This is a test document for RAG validation.")
                    .file_name("probe.txt"),
            );

        let response = http
            .post(format!("{}/documents", base_url))
            .multipart(form)
            .send()
            .await
            .context("Document upload probe failed to connect")?;
        if !response.status().is_success() {
            bail!("Document upload probe failed ({})", response.status());
        }

        let body = serde_json::json!({
            "query": "test document",
            "project_id": "validation_probe",
            "limit": 1,
        });
        let response = http
            .post(format!("{}/search", base_url))
            .json(&body)
            .send()
            .await
            .context("Search probe failed to connect")?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 404 {
            bail!("Search probe failed ({})", status);
        }

        Ok(())
    }
}

/// Parse `docker compose ps --format json` output.
///
/// Newer compose versions emit one JSON object per line; older ones emit a
/// single array. Unparseable rows are dropped rather than failing status.
fn parse_ps_output(stdout: &str) -> Vec<ComposeService> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).unwrap_or_default();
    }

    trimmed
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// Resolve the compose directory: `./docker` beside the current directory or
/// its parent, falling back to the configured path.
pub fn find_compose_dir(configured: &str) -> PathBuf {
    let configured = PathBuf::from(configured);
    if configured.is_dir() {
        return configured;
    }

    for base in [Path::new("."), Path::new("..")] {
        let candidate = base.join("docker");
        if candidate.is_dir() {
            return candidate;
        }
    }

    configured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parsing() {
        assert_eq!(
            "local".parse::<DeploymentProfile>().unwrap(),
            DeploymentProfile::Local
        );
        assert_eq!(
            "production".parse::<DeploymentProfile>().unwrap(),
            DeploymentProfile::Production
        );
        assert!("staging".parse::<DeploymentProfile>().is_err());
    }

    #[test]
    fn test_profile_compose_files() {
        assert_eq!(
            DeploymentProfile::Local.compose_file(),
            "docker-compose.local.yml"
        );
        assert_eq!(
            DeploymentProfile::Tei.compose_file(),
            "docker-compose.tei.yml"
        );
        assert_eq!(
            DeploymentProfile::Openai.compose_file(),
            "docker-compose.openai.yml"
        );
        assert_eq!(
            DeploymentProfile::Production.compose_file(),
            "docker-compose.production.yml"
        );
    }

    #[test]
    fn test_parse_ps_json_lines() {
        let out = r#"{"Service":"rag-api","State":"running","Health":"healthy"}
{"Service":"postgres","State":"running","Health":"starting"}"#;
        let services = parse_ps_output(out);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].service, "rag-api");
        assert_eq!(services[1].health.as_deref(), Some("starting"));
    }

    #[test]
    fn test_parse_ps_array() {
        let out = r#"[{"Service":"rag-api","State":"exited"}]"#;
        let services = parse_ps_output(out);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].state, "exited");
        assert_eq!(services[0].health, None);
    }

    #[test]
    fn test_parse_ps_garbage_is_empty() {
        assert!(parse_ps_output("").is_empty());
        assert!(parse_ps_output("not json at all").is_empty());
    }
}
