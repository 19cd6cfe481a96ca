/// Engine configuration.
///
/// Settings are layered, later layers overriding earlier ones key by key:
///   1. built-in defaults
///   2. the user config file (`<config dir>/pinpoint/config.toml`)
///   3. the workspace file (`<workspace>/.pinpoint.toml`)
///
/// Missing files are skipped silently; malformed files are errors.
use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the per-workspace override.
pub const WORKSPACE_CONFIG_FILE: &str = ".pinpoint.toml";

/// Directory and file name under the user's config dir.
pub const USER_CONFIG_DIR: &str = "pinpoint";
pub const USER_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root that relative file paths and directory outlines resolve against.
    #[serde(skip)]
    pub workspace_root: PathBuf,
    /// Result snapshots kept per pagination cache before LRU eviction.
    pub pagination_capacity: usize,
    /// Concurrent hover requests during batch enrichment.
    pub hover_concurrency: usize,
    /// Concurrent per-file symbol fetches during directory outlines.
    pub scan_concurrency: usize,
    /// Deepest marker (`<<<…|…>>>`) considered when scanning a find pattern.
    pub max_marker_depth: usize,
    /// Hop limit for relation searches that do not set their own.
    pub relation_max_depth: usize,
    /// File suffixes included in directory outlines; empty means every file.
    pub source_suffixes: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::new(),
            pagination_capacity: 128,
            hover_concurrency: 32,
            scan_concurrency: 10,
            max_marker_depth: 10,
            relation_max_depth: 10,
            source_suffixes: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load the layered configuration for `workspace_root`.
    pub fn load(workspace_root: &Path) -> Result<Self, ConfigError> {
        let user = etcetera::choose_base_strategy()
            .ok()
            .map(|strategy| {
                strategy
                    .config_dir()
                    .join(USER_CONFIG_DIR)
                    .join(USER_CONFIG_FILE)
            });
        let workspace = workspace_root.join(WORKSPACE_CONFIG_FILE);

        let layers: Vec<PathBuf> = user.into_iter().chain(Some(workspace)).collect();
        Self::load_layers(workspace_root, &layers)
    }

    /// Merge the given files in order on top of the defaults.
    pub fn load_layers(workspace_root: &Path, layers: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = toml::Table::new();
        for path in layers {
            let Some(table) = read_table(path)? else {
                continue;
            };
            tracing::debug!(path = %path.display(), "applying config layer");
            merged.extend(table);
        }

        let mut config: EngineConfig = toml::Value::Table(merged).try_into()?;
        config.workspace_root = workspace_root.to_path_buf();
        Ok(config)
    }

    /// Whether `path` should be scanned by a directory outline.
    pub fn accepts_file(&self, path: &Path) -> bool {
        if self.source_suffixes.is_empty() {
            return true;
        }
        let name = path.to_string_lossy();
        self.source_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }
}

fn read_table(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    content
        .parse::<toml::Table>()
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
