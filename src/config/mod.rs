//! Configuration module for bucketwise
//!
//! This module provides configuration management including:
//! - Path resolution (environment override or platform config dir)
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::BucketwisePaths;
pub use settings::Settings;
