//! Touchline - local persistence layer for a team coaching app
//!
//! This library keeps teams, rosters, seasons, tournaments, staff and saved
//! games in a local key-value store, and keeps concurrent read-modify-write
//! cycles from losing each other's updates.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `lock`: Per-key FIFO locks
//! - `storage`: Adapter trait, file/memory/legacy backends and the codec
//! - `models`: Entity types and their validation rules
//! - `services`: One manager per entity, all writes under the key lock
//! - `migration`: One-shot move from the legacy store with rollback
//! - `backup`: Whole-state export and partial-success import
//! - `cli`, `display`: The `touchline` command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use touchline::config::{StoreConfig, TouchlinePaths};
//! use touchline::services::{EntityStore, TeamService};
//!
//! let paths = TouchlinePaths::new()?;
//! let config = StoreConfig::load_or_create(&paths)?;
//! let store = EntityStore::open(paths, &config);
//! let team = TeamService::new(&store).create("Under 12 Girls").await?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod lock;
pub mod migration;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{TouchlineError, TouchlineResult};
