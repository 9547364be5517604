//! Source configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizboard_core::model::SelectionRules;
use quizboard_core::query::DEFAULT_PAGE_SIZE;
use quizboard_core::traits::SourceFetcher;

use crate::http::{HttpSource, DEFAULT_TIMEOUT_SECS};
use crate::local::LocalSource;
use crate::template::PathTemplates;

/// Environment variable that replaces the configured source with an HTTP one.
pub const BASE_URL_ENV: &str = "QUIZBOARD_BASE_URL";

/// Where the tables live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Http {
        base_url: String,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
    Local {
        #[serde(default = "default_root")]
        root: PathBuf,
    },
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_root() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Local {
            root: default_root(),
        }
    }
}

/// Top-level quizboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizboardConfig {
    /// Accepted levels.
    #[serde(default = "default_levels")]
    pub levels: Vec<u8>,
    /// Accepted locations; empty accepts any.
    #[serde(default)]
    pub locations: Vec<String>,
    /// Accepted months; empty accepts any.
    #[serde(default)]
    pub months: Vec<String>,
    /// Rows per page for `query`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub paths: PathTemplates,
}

fn default_levels() -> Vec<u8> {
    SelectionRules::default().levels
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for QuizboardConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            locations: Vec::new(),
            months: Vec::new(),
            page_size: default_page_size(),
            source: SourceConfig::default(),
            paths: PathTemplates::default(),
        }
    }
}

impl QuizboardConfig {
    pub fn selection_rules(&self) -> SelectionRules {
        SelectionRules {
            levels: self.levels.clone(),
            locations: self.locations.clone(),
            months: self.months.clone(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::Http {
            base_url,
            timeout_secs,
        } => SourceConfig::Http {
            base_url: resolve_env_vars(base_url),
            timeout_secs: *timeout_secs,
        },
        SourceConfig::Local { root } => SourceConfig::Local {
            root: PathBuf::from(resolve_env_vars(&root.to_string_lossy())),
        },
    }
}

/// Switch to an HTTP source at `base_url`, keeping any configured timeout.
fn apply_base_url_override(config: &mut QuizboardConfig, base_url: String) {
    let timeout_secs = match &config.source {
        SourceConfig::Http { timeout_secs, .. } => *timeout_secs,
        SourceConfig::Local { .. } => DEFAULT_TIMEOUT_SECS,
    };
    config.source = SourceConfig::Http {
        base_url,
        timeout_secs,
    };
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizboard.toml` in the current directory
/// 2. `~/.config/quizboard/config.toml`
///
/// `QUIZBOARD_BASE_URL` overrides the source with an HTTP one.
pub fn load_config() -> Result<QuizboardConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizboardConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizboard.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizboardConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizboardConfig::default(),
    };

    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        if !base_url.trim().is_empty() {
            apply_base_url_override(&mut config, base_url);
        }
    }

    config.source = resolve_source_config(&config.source);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizboard"))
}

/// Create a source instance from the configuration.
pub fn create_source(config: &QuizboardConfig) -> Result<Box<dyn SourceFetcher>> {
    match &config.source {
        SourceConfig::Http {
            base_url,
            timeout_secs,
        } => {
            if base_url.trim().is_empty() {
                anyhow::bail!("source.base_url is empty (set it in the config or {BASE_URL_ENV})");
            }
            let source = HttpSource::new(base_url, config.paths.clone(), *timeout_secs)
                .context("failed to create HTTP source")?;
            Ok(Box::new(source))
        }
        SourceConfig::Local { root } => Ok(Box::new(LocalSource::new(
            root.clone(),
            config.paths.clone(),
        ))),
    }
}

/// Starter config written by `quizboard init`.
pub const STARTER_CONFIG: &str = r#"# quizboard configuration

levels = [0, 1, 2, 3, 4]
# Empty lists accept any value.
locations = []
months = []
page_size = 10

[source]
type = "local"
root = "./data"
# type = "http"
# base_url = "${QUIZBOARD_DATA_URL}"
# timeout_secs = 30

[paths]
responses = "{location}/{month}/level{level}.csv"
meta = "{location}/{month}/level{level}_meta.csv"
"#;
