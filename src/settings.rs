use serde::{Deserialize, Serialize};

/// Per-session game settings, copied (never referenced) into each generation
/// call so that mid-generation edits cannot shear a request in half.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub explicitness: u8,            // 1: clean and wholesome, 5: wild and edgy.
    pub player_details: String,      // E.g., "Bob hates spiders".
    pub theme: String,               // E.g., "Party", "Holiday".
    pub custom_instructions: String, // E.g., "Make the penalties harsh".
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            explicitness: 1,
            player_details: String::new(),
            theme: "General".to_string(),
            custom_instructions: String::new(),
        }
    }
}

impl GameSettings {
    pub fn new() -> Self {
        Self::default()
    }

    // Explicitness outside 1..=5 is meaningless to the prompt instructions.
    pub fn clamped(mut self) -> Self {
        self.explicitness = self.explicitness.clamp(1, 5);
        self
    }
}
