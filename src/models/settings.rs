//! Application settings
//!
//! A single record, not a collection. User-facing preferences that the UI
//! layer persists alongside the entity data.

use serde::{Deserialize, Serialize};

use super::ids::GameId;
use super::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Game the app reopens on launch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_game_id: Option<GameId>,

    #[serde(default)]
    pub last_home_team_name: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub has_seen_app_guide: bool,

    #[serde(default)]
    pub use_demand_correction: bool,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            current_game_id: None,
            last_home_team_name: String::new(),
            language: default_language(),
            has_seen_app_guide: false,
            use_demand_correction: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub last_home_team_name: Option<String>,
    pub language: Option<String>,
    pub has_seen_app_guide: Option<bool>,
    pub use_demand_correction: Option<bool>,
}

impl AppSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(name) = patch.last_home_team_name {
            self.last_home_team_name = name;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(seen) = patch.has_seen_app_guide {
            self.has_seen_app_guide = seen;
        }
        if let Some(correction) = patch.use_demand_correction {
            self.use_demand_correction = correction;
        }
    }
}

impl Validate for AppSettings {
    fn validate(&self) -> Result<(), String> {
        let lang = self.language.trim();
        if lang.is_empty() || lang.len() > 10 {
            return Err(format!("invalid language tag '{}'", self.language));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.language, "en");
    }
}
