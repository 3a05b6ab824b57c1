//! # Configuration
//!
//! Layered settings for the CLI and the HTTP server:
//!
//! 1. Built-in defaults
//! 2. TOML file (`gradtrack.toml` in the working directory, or `--config`)
//! 3. Environment (`GRADTRACK_RATE_LIMIT`, `GRADTRACK_CORS_ORIGINS`)
//! 4. Command-line flags, applied by the CLI after loading
//!
//! ```toml
//! [allocation]
//! tie_break = "created_at"
//! cohort = "evening"
//!
//! [snapshot]
//! path = "data/gradtrack.json"
//! max_size_bytes = 67108864
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! rate_limit = 50
//! cors_origins = ["https://admin.example.edu"]
//! ```

use gradtrack_core::{AllocationOptions, GradTrackError, StudyType, TieBreak};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "gradtrack.toml";

/// Snapshot document used when neither the file nor the CLI names one.
pub const DEFAULT_SNAPSHOT_FILE: &str = "gradtrack.json";

/// Largest snapshot file accepted from disk (64 MB).
pub const DEFAULT_MAX_SNAPSHOT_BYTES: u64 = 64 * 1024 * 1024;

/// Largest config file accepted from disk (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// `[allocation]`: defaults for runs that do not say otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocationSection {
    pub tie_break: TieBreak,
    pub cohort: Option<StudyType>,
}

impl AllocationSection {
    /// Options for a run, overriding configured defaults with explicit values.
    #[must_use]
    pub fn options(&self, cohort: Option<StudyType>, tie_break: Option<TieBreak>) -> AllocationOptions {
        AllocationOptions {
            tie_break: tie_break.unwrap_or(self.tie_break),
            cohort: cohort.or(self.cohort),
        }
    }
}

/// `[snapshot]`: where records live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotSection {
    pub path: PathBuf,
    pub max_size_bytes: u64,
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            max_size_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }
}

/// `[server]`: HTTP listener and protections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Allowed CORS origins. Empty means localhost only, `["*"]` allows all.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: 100,
            cors_origins: Vec::new(),
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub allocation: AllocationSection,
    pub snapshot: SnapshotSection,
    pub server: ServerSection,
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, GradTrackError> {
        toml::from_str(raw).map_err(|e| GradTrackError::InvalidConfig(e.to_string()))
    }

    /// Load configuration and apply environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `gradtrack.toml` is read
    /// if present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, GradTrackError> {
        let mut config = match path {
            Some(p) => Self::read_file(p)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::read_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, GradTrackError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            GradTrackError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(GradTrackError::InvalidConfig(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GradTrackError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            GradTrackError::InvalidConfig(msg) => {
                GradTrackError::InvalidConfig(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Apply `GRADTRACK_*` overrides from `lookup`.
    ///
    /// Unparseable values are ignored with a warning so a typo in the
    /// environment never takes the server down.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("GRADTRACK_RATE_LIMIT") {
            match raw.trim().parse::<u32>() {
                Ok(rps) => self.server.rate_limit = rps,
                Err(_) => tracing::warn!("Ignoring invalid GRADTRACK_RATE_LIMIT '{}'", raw),
            }
        }
        if let Some(raw) = lookup("GRADTRACK_CORS_ORIGINS") {
            self.server.cors_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
