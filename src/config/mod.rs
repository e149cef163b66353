//! Configuration module for Touchline
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Store tunables (lock timeout, migration retries, backend choice)

pub mod paths;
pub mod settings;

pub use paths::TouchlinePaths;
pub use settings::{BackendKind, StoreConfig};
