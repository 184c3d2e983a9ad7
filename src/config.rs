use crate::services::catalog::StoryCatalog;
use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Server settings, read from the environment.
///
/// | Env var              | Default                 |
/// |----------------------|-------------------------|
/// | `HOST`               | `0.0.0.0`               |
/// | `PORT`               | `3000`                  |
/// | `STORY_CATALOG_PATH` | catalog built into the binary |
/// | `BODY_LIMIT_BYTES`   | `10485760`              |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub catalog_path: Option<PathBuf>,
    pub body_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            catalog_path: None,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => defaults.port,
        };

        let catalog_path = lookup("STORY_CATALOG_PATH")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let body_limit_bytes = match lookup("BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("BODY_LIMIT_BYTES must be a byte count, got '{}'", raw))?,
            None => defaults.body_limit_bytes,
        };

        Ok(Self {
            host,
            port,
            catalog_path,
            body_limit_bytes,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn load_catalog(&self) -> Result<StoryCatalog> {
        match &self.catalog_path {
            Some(path) => StoryCatalog::load(path)
                .with_context(|| format!("loading story catalog from {}", path.display())),
            None => StoryCatalog::embedded().context("loading embedded story catalog"),
        }
    }
}
