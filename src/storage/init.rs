//! Storage initialization
//!
//! Handles first-run setup: directories, settings and empty data files.

use crate::config::{BucketwisePaths, Settings};
use crate::error::BucketwiseError;

use super::catalog::CatalogData;
use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation.
///
/// Existing files are left alone. Returns whether anything was created.
pub fn initialize_storage(
    paths: &BucketwisePaths,
    settings: &Settings,
) -> Result<bool, BucketwiseError> {
    paths.ensure_directories()?;
    let mut created = false;

    if !paths.settings_file().exists() {
        settings.save(paths)?;
        created = true;
    }

    if !paths.catalog_file().exists() {
        write_json_atomic(paths.catalog_file(), &CatalogData::default())?;
        created = true;
    }

    if !paths.events_file().exists() {
        write_json_atomic(paths.events_file(), &serde_json::json!({ "events": [] }))?;
        created = true;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_files_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BucketwisePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(initialize_storage(&paths, &Settings::default()).unwrap());
        assert!(paths.is_initialized());
        assert!(paths.catalog_file().exists());
        assert!(paths.events_file().exists());

        assert!(!initialize_storage(&paths, &Settings::default()).unwrap());
    }
}
