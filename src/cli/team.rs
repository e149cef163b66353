//! Team CLI commands

use clap::Subcommand;

use crate::display::format_team_list;
use crate::error::{TouchlineError, TouchlineResult};
use crate::models::team::TeamPatch;
use crate::services::{EntityStore, TeamService};

/// Team subcommands
#[derive(Subcommand)]
pub enum TeamCommands {
    /// Create a new team
    Add {
        /// Team name (unique, case-insensitive)
        name: String,
        /// Display color (e.g. "#1e88e5")
        #[arg(short, long)]
        color: Option<String>,
    },
    /// List teams
    List {
        /// Include archived teams
        #[arg(short, long)]
        all: bool,
    },
    /// Delete a team
    Remove {
        /// Team name or ID
        team: String,
    },
}

pub async fn handle_team_command(store: &EntityStore, cmd: TeamCommands) -> TouchlineResult<()> {
    let service = TeamService::new(store);

    match cmd {
        TeamCommands::Add { name, color } => {
            let mut team = service.create(&name).await?;
            if color.is_some() {
                team = service
                    .update(
                        team.id.as_str(),
                        TeamPatch {
                            color,
                            ..TeamPatch::default()
                        },
                    )
                    .await?;
            }

            println!("Created team: {}", team.name);
            println!("  ID: {}", team.id);
        }

        TeamCommands::List { all } => {
            let teams = if all {
                service.list().await?
            } else {
                service.list_active().await?
            };
            print!("{}", format_team_list(&teams));
        }

        TeamCommands::Remove { team } => {
            let found = service
                .find(&team)
                .await?
                .ok_or_else(|| TouchlineError::team_not_found(&team))?;

            let removed = service.remove(found.id.as_str()).await?;
            println!("Removed team: {}", removed.name);
        }
    }

    Ok(())
}
