// Range limits injected into validation
// Loaded from ~/.config/jobsettings/limits.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted `max_page_search_size`.
pub const MIN_PAGE_SEARCH_SIZE: i32 = 10;

/// Bucket limit used when no limits file is configured.
pub const DEFAULT_MAX_BUCKETS: u32 = 65_536;

#[derive(Debug, Error)]
pub enum LimitsError {
    #[error("cannot read limits file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("limits parse error: {0}")]
    Parse(String),
    #[error("limits validation error: max_buckets must be at least {min}, got {max_buckets}")]
    MaxBucketsTooSmall { max_buckets: u32, min: i32 },
}

/// Deployment limits consulted by [`SettingsModel::validate`](crate::SettingsModel::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Upper bound for `max_page_search_size`.
    pub max_buckets: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }
}

impl Limits {
    pub fn with_max_buckets(max_buckets: u32) -> Self {
        Self { max_buckets }
    }

    /// Default limits file location
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jobsettings")
            .join("limits.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, LimitsError> {
        let limits: Limits = toml::from_str(input).map_err(|e| LimitsError::Parse(e.to_string()))?;
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), LimitsError> {
        if i64::from(self.max_buckets) < i64::from(MIN_PAGE_SEARCH_SIZE) {
            return Err(LimitsError::MaxBucketsTooSmall {
                max_buckets: self.max_buckets,
                min: MIN_PAGE_SEARCH_SIZE,
            });
        }
        Ok(())
    }

    /// Load limits.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file means built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, LimitsError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path(), false),
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no limits file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| LimitsError::Io {
            path: path.clone(),
            source,
        })?;
        let limits = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), max_buckets = limits.max_buckets, "loaded limits");
        Ok(limits)
    }

    /// Like [`Limits::load`], but falls back to defaults on any error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match Self::load(path) {
            Ok(limits) => limits,
            Err(e) => {
                tracing::warn!(error = %e, "using default limits");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_limits() {
        let limits = Limits::from_toml("max_buckets = 10000\n").unwrap();
        assert_eq!(limits.max_buckets, 10_000);
    }

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(Limits::from_toml("").unwrap(), Limits::default());
        assert_eq!(Limits::default().max_buckets, DEFAULT_MAX_BUCKETS);
    }

    #[test]
    fn reject_unknown_key() {
        let err = Limits::from_toml("max_bucket = 10").unwrap_err();
        assert!(matches!(err, LimitsError::Parse(_)));
    }

    #[test]
    fn reject_bound_below_minimum() {
        let err = Limits::from_toml("max_buckets = 9").unwrap_err();
        assert!(err.to_string().contains("at least 10"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Limits::load(Some(&missing)), Err(LimitsError::Io { .. })));
        assert_eq!(Limits::load_or_default(Some(&missing)), Limits::default());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("limits.toml");
        fs::write(&path, "max_buckets = 250\n").unwrap();
        assert_eq!(Limits::load(Some(&path)).unwrap(), Limits::with_max_buckets(250));
    }
}
