//! Personnel CLI commands

use clap::Subcommand;

use crate::display::format_personnel_list;
use crate::error::{TouchlineError, TouchlineResult};
use crate::models::PersonnelRole;
use crate::services::{EntityStore, PersonnelService};

/// Personnel subcommands
#[derive(Subcommand)]
pub enum PersonnelCommands {
    /// Add a staff member
    Add {
        /// Name (unique, case-insensitive)
        name: String,
        /// Role (head-coach, assistant, goalkeeper, fitness, physio, manager, other)
        #[arg(short, long, default_value = "other")]
        role: String,
    },
    /// List staff members
    List {
        /// Only show this role
        #[arg(short, long)]
        role: Option<String>,
    },
    /// Remove a staff member and their game assignments
    Remove {
        /// Name or ID
        member: String,
    },
}

pub async fn handle_personnel_command(
    store: &EntityStore,
    cmd: PersonnelCommands,
) -> TouchlineResult<()> {
    let service = PersonnelService::new(store);

    match cmd {
        PersonnelCommands::Add { name, role } => {
            let role = parse_role(&role)?;
            let member = service.create(&name, role).await?;

            println!("Added {}: {}", member.role, member.name);
            println!("  ID: {}", member.id);
        }

        PersonnelCommands::List { role } => {
            let personnel = match role {
                Some(role) => service.list_by_role(parse_role(&role)?).await?,
                None => service.list().await?,
            };
            print!("{}", format_personnel_list(&personnel));
        }

        PersonnelCommands::Remove { member } => {
            let found = service
                .find(&member)
                .await?
                .ok_or_else(|| TouchlineError::personnel_not_found(&member))?;

            let removal = service.remove_personnel_member(found.id.as_str()).await?;
            println!("Removed {}", removal.removed.name);
            if removal.games_updated > 0 {
                println!("  Unassigned from {} game(s)", removal.games_updated);
            }
        }
    }

    Ok(())
}

fn parse_role(role: &str) -> TouchlineResult<PersonnelRole> {
    PersonnelRole::parse(role).ok_or_else(|| {
        TouchlineError::ValidationFailed(format!(
            "Invalid role: '{}'. Valid roles: head-coach, assistant, goalkeeper, fitness, physio, manager, other",
            role
        ))
    })
}
