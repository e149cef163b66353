use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use touchline::backup::BackupManager;
use touchline::cli::{
    handle_backup_command, handle_config, handle_export, handle_import, handle_migrate,
    handle_personnel_command, handle_status, handle_team_command, BackupCommands,
    PersonnelCommands, TeamCommands,
};
use touchline::config::{StoreConfig, TouchlinePaths};
use touchline::migration::MigrationEngine;
use touchline::services::EntityStore;
use touchline::TouchlineError;

#[derive(Parser)]
#[command(
    name = "touchline",
    author = "Kaylee Beyene",
    version,
    about = "Local data store for a team coaching app",
    long_about = "Touchline keeps teams, rosters, seasons, tournaments, staff and saved \
                  games on this machine. It migrates data from the old single-file \
                  store on first run and can export or import everything as JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show backend, migration state and record counts
    Status,

    /// Migrate data from the legacy store now
    Migrate,

    /// Export every collection to a JSON file
    Export {
        /// Destination file
        file: PathBuf,
    },

    /// Import an exported JSON file
    Import {
        /// File produced by `touchline export` or `touchline backup create`
        file: PathBuf,
        /// Only check the file, change nothing
        #[arg(long)]
        check: bool,
    },

    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Team management commands
    #[command(subcommand)]
    Team(TeamCommands),

    /// Coaching staff commands
    #[command(subcommand, alias = "staff")]
    Personnel(PersonnelCommands),

    /// Show current configuration and paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TOUCHLINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Initialize paths and configuration
    let paths = TouchlinePaths::new()?;
    let config = StoreConfig::load_or_create(&paths)?;
    paths.ensure_directories()?;

    let store = EntityStore::open(paths.clone(), &config);
    let engine = MigrationEngine::from_config(store.clone(), &paths, &config);

    let Some(command) = cli.command else {
        println!("Touchline - local data store for a team coaching app");
        println!();
        println!("Run 'touchline --help' for usage information.");
        return Ok(());
    };

    // Everything except `migrate` and `config` sees migrated data. A failed
    // migration has been rolled back and the store now serves legacy data.
    if !matches!(command, Commands::Migrate | Commands::Config) {
        match engine.run_with_retry().await {
            Ok(_) => {}
            Err(TouchlineError::MigrationFailed(reason)) => {
                eprintln!(
                    "Warning: data migration failed ({}); using the legacy store. Run `touchline migrate` to retry.",
                    reason
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    match command {
        Commands::Status => handle_status(&store, &engine).await?,
        Commands::Migrate => handle_migrate(&engine).await?,
        Commands::Export { file } => handle_export(&store, &file).await?,
        Commands::Import { file, check } => handle_import(&store, &file, check).await?,
        Commands::Backup(cmd) => {
            let manager = BackupManager::from_config(store.clone(), &paths, &config);
            handle_backup_command(&manager, cmd).await?;
        }
        Commands::Team(cmd) => handle_team_command(&store, cmd).await?,
        Commands::Personnel(cmd) => handle_personnel_command(&store, cmd).await?,
        Commands::Config => handle_config(&paths, &config),
    }

    Ok(())
}
