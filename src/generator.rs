use std::sync::Arc;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::ai::PromptModel;
use crate::deck::ExampleDeck;
use crate::error::StoreError;
use crate::history::ConversationHistory;
use crate::prompt_type::PromptType;
use crate::session::GameSession;
use crate::settings::GameSettings;
use crate::store::SessionStore;
use crate::substitute::substitute_names;

/// How many completions are requested before giving up on the model for one
/// turn.
pub const MAX_AI_ATTEMPTS: usize = 3;

/// The terminal fallback phrase; shown when there is nothing else to show.
pub const OUT_OF_IDEAS: &str = "I'm all out of ideas! Everybody drink!";

/// The three independent coin flips behind one generation. Drawn from the
/// generator's injected rng in normal play; tests pass a fixed policy to
/// force a branch.
#[derive(Clone, Copy, Debug)]
pub struct GenerationPolicy {
    /// Target one random player instead of the whole group.
    pub target_single_player: bool,
    /// Fold the free-text player details into the request.
    pub use_player_details: bool,
    /// Ask the model instead of drawing from the deck.
    pub use_ai: bool,
}

impl GenerationPolicy {
    pub fn draw(rng: &mut impl Rng) -> Self {
        Self {
            target_single_player: rng.random_bool(0.5),
            use_player_details: rng.random_bool(0.5),
            use_ai: rng.random_bool(0.5),
        }
    }
}

/// Produces one new, usually-non-duplicate prompt per call and persists it.
///
/// The generator never fails: model errors collapse into empty strings and
/// ride the fallback chain (model -> deck -> uniform random draw), so every
/// call ends with a displayable string. A failed store write is kept as an
/// error signal for the UI rather than propagated.
pub struct PromptGenerator {
    model: Option<Arc<dyn PromptModel>>,
    store: Arc<dyn SessionStore>,
    deck: ExampleDeck,
    history: ConversationHistory,
    draw_pile: Vec<String>,
    rng: StdRng,
    offline: bool,
    last_store_error: Option<StoreError>,
}

impl PromptGenerator {
    pub fn new(
        model: Option<Arc<dyn PromptModel>>,
        store: Arc<dyn SessionStore>,
        deck: ExampleDeck,
    ) -> Self {
        Self::with_rng(model, store, deck, StdRng::from_os_rng())
    }

    /// A generator with a caller-supplied rng, so tests can seed it.
    pub fn with_rng(
        model: Option<Arc<dyn PromptModel>>,
        store: Arc<dyn SessionStore>,
        deck: ExampleDeck,
        rng: StdRng,
    ) -> Self {
        Self {
            model,
            store,
            deck,
            history: ConversationHistory::new(),
            draw_pile: Vec::new(),
            rng,
            offline: false,
            last_store_error: None,
        }
    }

    /// Forces deck-only mode regardless of the policy draw.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// The store failure from the most recent call, if any. The prompt
    /// itself was still produced; only its persistence failed.
    pub fn last_store_error(&self) -> Option<&StoreError> {
        self.last_store_error.as_ref()
    }

    /// Rebuilds the fixed conversation prefix and restocks the deck working
    /// copy. Called on first use and whenever settings or the roster change.
    pub fn reset_context(&mut self, settings: &GameSettings, players: &[String]) {
        self.history
            .rebuild_prefix(settings, players, &self.deck, &mut self.rng);
        self.draw_pile = self.deck.shuffled(&mut self.rng);
    }

    pub async fn generate(&mut self, session: &GameSession) -> String {
        let policy = GenerationPolicy::draw(&mut self.rng);
        self.generate_with_policy(session, policy).await
    }

    pub async fn generate_with_policy(
        &mut self,
        session: &GameSession,
        policy: GenerationPolicy,
    ) -> String {
        if session.players.is_empty() {
            return OUT_OF_IDEAS.to_string();
        }

        let settings = session.settings.clone().unwrap_or_default().clamped();
        if self.history.is_empty() {
            self.reset_context(&settings, &session.players);
        }

        let target = if policy.target_single_player {
            let name = session
                .players
                .choose(&mut self.rng)
                .cloned()
                .unwrap_or_default();
            format!("a random player: {name}")
        } else {
            "the whole group".to_string()
        };

        let details_hint = if policy.use_player_details && !settings.player_details.is_empty() {
            " Choose some player details and incorporate them into the prompt."
        } else {
            ""
        };

        let use_model = policy.use_ai && !self.offline;
        let mut prompt = match self.model.clone() {
            Some(model) if use_model => {
                self.complete_with_retries(model.as_ref(), session, &target, details_hint)
                    .await
            }
            _ => self.draw_from_pile(),
        };

        // Both paths exhausted or duplicated: uniform draw from the full
        // deck, duplicates tolerated as a terminal best-effort result.
        if prompt.is_empty() || session.prompts.iter().any(|p| p == &prompt) {
            prompt = self
                .deck
                .random(&mut self.rng)
                .map(str::to_string)
                .unwrap_or_else(|| OUT_OF_IDEAS.to_string());
        }

        let prompt = substitute_names(&prompt, &session.players, &mut self.rng);

        self.history.push_assistant(&prompt);

        self.last_store_error = None;
        if let Err(err) = self.store.append_prompt(&session.id, &prompt).await {
            warn!("failed to persist prompt for session {}: {err}", session.id);
            self.last_store_error = Some(err);
        }

        prompt
    }

    /// The AI path: up to [`MAX_AI_ATTEMPTS`] sequential completions,
    /// stopping at the first non-empty result not already used in this
    /// session. Model failures surface as empty strings, never as errors.
    async fn complete_with_retries(
        &mut self,
        model: &dyn PromptModel,
        session: &GameSession,
        target: &str,
        details_hint: &str,
    ) -> String {
        let mut attempts = 0;
        let mut result = String::new();

        while attempts < MAX_AI_ATTEMPTS {
            let kind = PromptType::random(&mut self.rng);
            let request = format!(
                "Follow the example styles above. Generate a new {kind} style prompt for \
                 {} players. Target {target}. Avoid repeats from past prompts: {}. Tie \
                 into the initialized settings and examples. Keep the prompts short and \
                 straight forward, under 30 words.{details_hint}",
                session.players.len(),
                session.prompts.join("; "),
            );
            let messages = self.history.request_messages(request);

            result = match model.complete(&messages).await {
                Ok(text) => text,
                Err(err) => {
                    warn!("prompt completion failed: {err}");
                    String::new()
                }
            };
            attempts += 1;
            info!("attempt {attempts} of {MAX_AI_ATTEMPTS}: {result}");

            if !result.is_empty() && !session.prompts.iter().any(|p| p == &result) {
                return result;
            }
        }

        result
    }

    /// The deck path: pop from the shuffled working copy, refilling it with
    /// a fresh shuffle of the full deck once exhausted.
    fn draw_from_pile(&mut self) -> String {
        if self.draw_pile.is_empty() {
            info!("deck working copy exhausted, reshuffling");
            self.draw_pile = self.deck.shuffled(&mut self.rng);
        }
        self.draw_pile.pop().unwrap_or_default()
    }
}
