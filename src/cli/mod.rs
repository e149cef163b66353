//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backup;
pub mod data;
pub mod personnel;
pub mod team;

pub use backup::{handle_backup_command, BackupCommands};
pub use data::{handle_config, handle_export, handle_import, handle_migrate, handle_status};
pub use personnel::{handle_personnel_command, PersonnelCommands};
pub use team::{handle_team_command, TeamCommands};
