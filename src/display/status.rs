//! Store status formatting

use crate::migration::{MigrationState, MigrationStatus};

pub fn format_migration_status(status: &MigrationStatus) -> String {
    let mut output = format!("Migration: {}", status.state);
    if let Some(completed_at) = status.completed_at {
        output.push_str(&format!(
            " ({})",
            completed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    output.push('\n');

    if status.state == MigrationState::RolledBack {
        if let Some(error) = &status.last_error {
            output.push_str(&format!("  Last error: {}\n", error));
        }
    }
    output
}

/// Record counts per collection, one per line
pub fn format_collection_counts(counts: &[(&str, usize)]) -> String {
    let width = counts
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for (name, count) in counts {
        output.push_str(&format!("  {:<width$}  {:>6}\n", name, count, width = width));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolled_back_shows_error() {
        let status = MigrationStatus::rolled_back("checksum mismatch for 'soccerTeams'");
        let output = format_migration_status(&status);
        assert!(output.starts_with("Migration: rolled back"));
        assert!(output.contains("checksum mismatch"));
    }

    #[test]
    fn test_committed_shows_time() {
        let output = format_migration_status(&MigrationStatus::committed());
        assert!(output.starts_with("Migration: committed ("));
    }

    #[test]
    fn test_counts_aligned() {
        let output = format_collection_counts(&[("teams", 2), ("adjustments", 10)]);
        assert_eq!(output, "  teams             2\n  adjustments      10\n");
    }
}
