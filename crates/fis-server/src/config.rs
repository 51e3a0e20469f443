//! Server settings.
//!
//! Settings come from an optional TOML file (`fis.toml` in the working
//! directory, or `--config`), with CLI flags and `FIS_*` environment
//! variables taking precedence over the file, and the file over built-in
//! defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Cli;

const DEFAULT_LISTEN: &str = "0.0.0.0:8000";
const DEFAULT_UPSTREAM_URL: &str = "https://downloads.openwrt.org";
const DEFAULT_PUBLIC_PATH: &str = "public";
const DEFAULT_STORE_PATH: &str = "branches.json";
const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Resolved server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Socket address the server binds.
    pub listen: SocketAddr,
    /// Root URL of the upstream download tree.
    pub upstream_url: String,
    /// Directory of pre-generated public documents.
    pub public_path: PathBuf,
    /// Path of the branch/version store document.
    pub store_path: PathBuf,
    /// Response cache TTL.
    pub cache_ttl: Duration,
    /// Per-request upstream fetch timeout.
    pub fetch_timeout: Duration,
}

/// Optional overrides read from the settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    listen: Option<SocketAddr>,
    upstream_url: Option<String>,
    public_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
    cache_ttl: Option<u64>,
    fetch_timeout: Option<u64>,
}

impl SettingsFile {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl Settings {
    /// Resolve settings from CLI flags, environment, and the optional
    /// settings file. Precedence: CLI/env, then file, then defaults.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => SettingsFile::load(path)?,
            None => {
                let default = Path::new("fis.toml");
                if default.exists() {
                    SettingsFile::load(default)?
                } else {
                    SettingsFile::default()
                }
            }
        };

        Ok(Self {
            listen: cli.listen.or(file.listen).unwrap_or_else(|| {
                DEFAULT_LISTEN.parse().expect("default listen address parses")
            }),
            upstream_url: cli
                .upstream_url
                .clone()
                .or(file.upstream_url)
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            public_path: cli
                .public_path
                .clone()
                .or(file.public_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_PATH)),
            store_path: cli
                .store_path
                .clone()
                .or(file.store_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            cache_ttl: Duration::from_secs(
                cli.cache_ttl.or(file.cache_ttl).unwrap_or(DEFAULT_CACHE_TTL_SECS),
            ),
            fetch_timeout: Duration::from_secs(
                cli.fetch_timeout
                    .or(file.fetch_timeout)
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            ),
        })
    }
}
