mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "svs-index.db";
pub const DEFAULT_FETCH_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub manifest_path: Option<PathBuf>,
    pub fetch_timeout_sec: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Root URL of the hosting site. Only commands that sync need it.
    pub base_url: Option<String>,
    /// Local manifest file. When absent the manifest is fetched from the site.
    pub manifest_path: Option<PathBuf>,
    pub fetch_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let base_url = file.base_url.or_else(|| cli.base_url.clone());
        if let Some(url) = &base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("base_url must be an http(s) URL, got {:?}", url);
            }
        }

        let manifest_path = file
            .manifest_path
            .map(PathBuf::from)
            .or_else(|| cli.manifest_path.clone());
        if let Some(path) = &manifest_path {
            if !path.is_file() {
                bail!("Manifest file does not exist: {:?}", path);
            }
        }

        let fetch_timeout_sec = file
            .fetch_timeout_sec
            .or(cli.fetch_timeout_sec)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SEC);
        if fetch_timeout_sec == 0 {
            bail!("fetch_timeout_sec must be greater than 0");
        }

        Ok(Self {
            db_path,
            base_url,
            manifest_path,
            fetch_timeout_sec,
        })
    }

    /// Base URL for commands that talk to the site, status and reset work without it.
    pub fn require_base_url(&self) -> Result<&str> {
        self.base_url.as_deref().ok_or_else(|| {
            anyhow::anyhow!("base_url must be specified via --base-url or in config file")
        })
    }
}
