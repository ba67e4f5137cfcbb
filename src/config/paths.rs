//! Path management for bucketwise
//!
//! ## Path Resolution Order
//!
//! 1. `BUCKETWISE_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories::ProjectDirs`
//!    (`~/.config/bucketwise` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::BucketwiseError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "BUCKETWISE_DATA_DIR";

/// Manages all paths used by bucketwise
#[derive(Debug, Clone)]
pub struct BucketwisePaths {
    /// Base directory for all bucketwise data
    base_dir: PathBuf,
}

impl BucketwisePaths {
    /// Resolve the base directory from the environment or the platform
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, BucketwiseError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to catalog.json (accounts, buckets and tags)
    pub fn catalog_file(&self) -> PathBuf {
        self.data_dir().join("catalog.json")
    }

    /// Get the path to events.json
    pub fn events_file(&self) -> PathBuf {
        self.data_dir().join("events.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), BucketwiseError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| BucketwiseError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| BucketwiseError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if bucketwise has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, BucketwiseError> {
    ProjectDirs::from("", "", "bucketwise")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| BucketwiseError::Config("Could not determine home directory".into()))
}
