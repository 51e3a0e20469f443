//! fis server - HTTP boundary for the firmware index service.
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
//!
//! Serves merged package-index documents for a firmware download tree and
//! the branch/version directory, with a TTL response cache in front.
//!
//! # Surface
//!
//! - `GET /` - branch/version directory (JSON)
//! - `GET /health` - liveness probe
//! - `GET /json/v1/{target}/index.json` - whole-target index
//! - `GET /json/v1/{target}/{arch}-index.json` - per-architecture index
//! - `GET /json/…` - pre-generated documents served from disk, taking
//!   precedence over dynamic generation
//! - `GET /overview` - legacy 301

pub mod config;
pub mod handlers;
pub mod routes;
pub mod state;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fisd")]
#[command(author, version, about = "fisd - firmware index server")]
pub struct Cli {
    /// Path to a TOML settings file (defaults to ./fis.toml when present)
    #[arg(long, env = "FIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Socket address to listen on
    #[arg(long, env = "FIS_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Root URL of the upstream download tree
    #[arg(long, env = "FIS_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Directory holding pre-generated public documents
    #[arg(long, env = "FIS_PUBLIC_PATH")]
    pub public_path: Option<PathBuf>,

    /// Path of the branch/version store document
    #[arg(long, env = "FIS_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// Response cache TTL in seconds
    #[arg(long, env = "FIS_CACHE_TTL")]
    pub cache_ttl: Option<u64>,

    /// Upstream fetch timeout in seconds
    #[arg(long, env = "FIS_FETCH_TIMEOUT")]
    pub fetch_timeout: Option<u64>,
}
