//! Display formatting for terminal output
//!
//! Plain-text tables for the CLI.

pub mod personnel;
pub mod status;
pub mod team;

pub use personnel::format_personnel_list;
pub use status::{format_collection_counts, format_migration_status};
pub use team::format_team_list;
