//! Service layer for Touchline
//!
//! One manager per entity type. Managers never touch the storage backend
//! directly: every mutation goes through [`EntityStore`], which wraps it in
//! the key's lock as a full read-modify-write.

pub mod adjustment;
pub mod game;
mod named;
pub mod personnel;
pub mod player;
pub mod season;
pub mod settings;
pub mod store;
pub mod team;
pub mod tournament;

pub use adjustment::AdjustmentService;
pub use game::{GamePatch, GameService};
pub use personnel::{PersonnelRemoval, PersonnelService};
pub use player::RosterService;
pub use season::SeasonService;
pub use settings::SettingsService;
pub use store::EntityStore;
pub use team::TeamService;
pub use tournament::TournamentService;
