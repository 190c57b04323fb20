use rand::Rng;

use crate::deck::ExampleDeck;
use crate::message::ChatMessage;
use crate::prompt_type::PromptType;
use crate::settings::GameSettings;

/// How many recent turns survive after each append. Was 10 in an earlier
/// design; 3 keeps request payloads small without losing continuity.
pub const ROLLING_WINDOW: usize = 3;
/// How many trailing rolling entries are sent with each request.
pub const REQUEST_TAIL: usize = 5;
/// How many curated examples are injected as few-shot pairs.
pub const FEW_SHOT_EXAMPLES: usize = 10;

/// The conversation context for the text-generation call: a fixed prefix
/// rebuilt wholesale whenever settings or the roster change, and a small
/// rolling window of recent turns, oldest discarded first.
#[derive(Clone, Debug, Default)]
pub struct ConversationHistory {
    fixed_prefix: Vec<ChatMessage>,
    rolling: Vec<ChatMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the fixed prefix has been built at least once.
    pub fn is_empty(&self) -> bool {
        self.fixed_prefix.is_empty()
    }

    pub fn rolling_len(&self) -> usize {
        self.rolling.len()
    }

    /// Invalidates and fully regenerates the fixed prefix, including a fresh
    /// shuffled sample of curated examples as few-shot context. No
    /// incremental patching: settings changes are rare and the prefix is
    /// cheap to rebuild.
    pub fn rebuild_prefix(
        &mut self,
        settings: &GameSettings,
        players: &[String],
        deck: &ExampleDeck,
        rng: &mut impl Rng,
    ) {
        let roster = players.join(", ");
        let details = if settings.player_details.is_empty() {
            String::new()
        } else {
            format!(" Player details for context: {}.", settings.player_details)
        };
        let custom = if settings.custom_instructions.is_empty() {
            String::new()
        } else {
            format!(" {}", settings.custom_instructions)
        };

        let mut prefix = vec![ChatMessage::system(format!(
            "You are a party game AI mimicking these example styles. Always generate \
             similar unique, fun prompts with penalties. Base on these fixed settings: \
             Explicitness level {}/5 (1: clean and wholesome; 5: wild and edgy). \
             Theme: {}. Players: {}.{}{} Keep prompts engaging, \
             conversation-provoking, and interesting. Use the following examples as \
             inspiration to generate new ones or select and adapt from them. Keep the \
             prompts short and straight forward, under 30 words.",
            settings.explicitness, settings.theme, roster, details, custom,
        ))];

        for example in deck.sample(rng, FEW_SHOT_EXAMPLES) {
            let kind = PromptType::random(rng);
            prefix.push(ChatMessage::user(format!(
                "Generate a {} style prompt for {} players, explicitness {}.",
                kind,
                players.len(),
                settings.explicitness,
            )));
            prefix.push(ChatMessage::assistant(example));
        }

        self.fixed_prefix = prefix;
    }

    /// Records a produced prompt and trims the rolling window.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.rolling.push(ChatMessage::assistant(content));
        if self.rolling.len() > ROLLING_WINDOW {
            let excess = self.rolling.len() - ROLLING_WINDOW;
            self.rolling.drain(..excess);
        }
    }

    /// Assembles the message list for one generation request: fixed prefix,
    /// the trailing window of recent turns, and the fresh instruction turn.
    pub fn request_messages(&self, user_request: impl Into<String>) -> Vec<ChatMessage> {
        let mut messages = self.fixed_prefix.clone();
        let tail_start = self.rolling.len().saturating_sub(REQUEST_TAIL);
        messages.extend(self.rolling[tail_start..].iter().cloned());
        messages.push(ChatMessage::user(user_request));
        messages
    }
}
