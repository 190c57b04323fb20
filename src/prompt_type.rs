use rand::Rng;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// The fixed catalog of prompt styles used to bias generation requests.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum PromptType {
    #[strum(serialize = "voting game")]
    #[serde(rename = "voting game")]
    VotingGame, // E.g., "Vote on who is most likely to..."
    #[strum(serialize = "challenge")]
    #[serde(rename = "challenge")]
    Challenge, // E.g., physical/mental dares or tasks
    #[strum(serialize = "story")]
    #[serde(rename = "story")]
    Story, // E.g., collaborative storytelling or sharing
    #[strum(serialize = "targeting")]
    #[serde(rename = "targeting")]
    Targeting, // E.g., single out a player for a specific action
    #[strum(serialize = "trivia")]
    #[serde(rename = "trivia")]
    Trivia, // E.g., fun quizzes or facts
    #[strum(serialize = "role-play")]
    #[serde(rename = "role-play")]
    RolePlay, // E.g., impersonate or act out scenarios
    #[strum(serialize = "debate")]
    #[serde(rename = "debate")]
    Debate, // E.g., argue silly topics
    #[strum(serialize = "mimicry")]
    #[serde(rename = "mimicry")]
    Mimicry, // E.g., imitate sounds, actions, or people
}

impl PromptType {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::iter().choose(rng).unwrap_or(Self::Challenge)
    }
}
