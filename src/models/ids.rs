//! Strongly-typed ID wrappers for all entity types
//!
//! Ids look like `team_1718000000000_3f9a0c1e`: a type prefix, a millisecond
//! timestamp, and eight hex characters from a v4 UUID so two entities created
//! in the same tick do not collide. Ids written by older versions of the app
//! may not follow this shape and are accepted as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Build a fresh id string for the given prefix
pub fn generate_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, millis, &suffix[..8])
}

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new unique ID
            pub fn new() -> Self {
                Self(generate_id($prefix))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

define_id!(TeamId, "team");
define_id!(SeasonId, "season");
define_id!(TournamentId, "tournament");
define_id!(PlayerId, "player");
define_id!(GameId, "game");
define_id!(EventId, "event");
define_id!(PersonnelId, "personnel");
define_id!(AdjustmentId, "adj");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_shape() {
        let id = TeamId::new();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "team");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_ids_in_same_tick_are_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| PlayerId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = GameId::from("game_1_abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""game_1_abc""#);
        let parsed: GameId = serde_json::from_str(r#""legacy-id""#).unwrap();
        assert_eq!(parsed.as_str(), "legacy-id");
    }
}
