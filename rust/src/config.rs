//! Client settings: defaults, then `.env`, then process environment, then CLI.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TOP_K: i64 = 6;
pub const DEFAULT_CLAMP_LINES: usize = 4;

/// Range the query form advertises for the evidence count. Advisory only.
pub const TOP_K_HINT: std::ops::RangeInclusive<i64> = 1..=20;

const VAR_API_BASE: &str = "REPO_RAG_API_BASE";
const VAR_TOP_K: &str = "REPO_RAG_TOP_K";
const VAR_CLAMP_LINES: &str = "REPO_RAG_CLAMP_LINES";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub top_k: i64,
    /// Lines of chunk content shown while a chunk is collapsed.
    pub clamp_lines: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            top_k: DEFAULT_TOP_K,
            clamp_lines: DEFAULT_CLAMP_LINES,
        }
    }
}

impl ClientConfig {
    /// Loads `./.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`] but with an explicit env file. The file
    /// is read without touching the process environment, which still wins.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let file_err = |reason: String| ConfigError::EnvFile {
            path: path.display().to_string(),
            reason,
        };
        let mut from_file = HashMap::new();
        for item in dotenv::from_path_iter(path).map_err(|e| file_err(e.to_string()))? {
            let (key, value) = item.map_err(|e| file_err(e.to_string()))?;
            from_file.insert(key, value);
        }
        Self::from_lookup(|key| env::var(key).ok().or_else(|| from_file.get(key).cloned()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(base) = lookup(VAR_API_BASE) {
            cfg.api_base = normalize_base(&base, VAR_API_BASE)?;
        }
        if let Some(raw) = lookup(VAR_TOP_K) {
            cfg.top_k = parse_number(VAR_TOP_K, &raw)?;
        }
        if let Some(raw) = lookup(VAR_CLAMP_LINES) {
            cfg.clamp_lines = parse_number(VAR_CLAMP_LINES, &raw)?;
        }
        Ok(cfg)
    }

    /// Applies command-line flags on top of the loaded values.
    pub fn with_overrides(
        mut self,
        api_base: Option<String>,
        top_k: Option<i64>,
    ) -> Result<Self, ConfigError> {
        if let Some(base) = api_base {
            self.api_base = normalize_base(&base, "--api-base")?;
        }
        if let Some(k) = top_k {
            self.top_k = k;
        }
        Ok(self)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

fn normalize_base(raw: &str, var: &'static str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { var });
    }
    Ok(trimmed.to_string())
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_string(),
    })
}
