use crate::settings::GameSettings;
use serde::{Deserialize, Serialize};

/// Shared party-game state synchronized across devices through the session
/// store. `prompts` is append-only from this crate's perspective; `scores`
/// runs parallel to `players`, one penalty counter per player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default)]
    pub current_turn: usize,
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(default)]
    pub scores: Vec<u32>,
    #[serde(default)]
    pub settings: Option<GameSettings>,
}

impl GameSession {
    pub fn new(id: impl Into<String>, players: Vec<String>) -> Self {
        let scores = vec![0; players.len()];
        Self {
            id: id.into(),
            players,
            current_turn: 0,
            prompts: Vec::new(),
            scores,
            settings: None,
        }
    }

    pub fn last_prompt(&self) -> Option<&str> {
        self.prompts.last().map(String::as_str)
    }

    /// Adds one penalty for the given player. Returns false when the index is
    /// out of bounds, which happens transiently while a roster edit is still
    /// round-tripping through the store.
    pub fn bump_score(&mut self, player_index: usize) -> bool {
        match self.scores.get_mut(player_index) {
            Some(score) => {
                *score += 1;
                true
            }
            None => false,
        }
    }

    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = std::fs::File::open(path)?;
        let session: GameSession = serde_json::from_reader(file)?;
        Ok(session)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
