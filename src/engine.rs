use std::sync::Arc;

use crate::ai::PromptModel;
use crate::deck::ExampleDeck;
use crate::error::{EngineError, StoreError};
use crate::generator::{OUT_OF_IDEAS, PromptGenerator};
use crate::session::GameSession;
use crate::settings::GameSettings;
use crate::store::{SessionStore, SessionWatch};

/// Owns one attached session: keeps a local snapshot current through the
/// store subscription, rebuilds the generator's conversation context when
/// settings or the roster change remotely, and forwards game actions.
pub struct GameEngine {
    store: Arc<dyn SessionStore>,
    generator: PromptGenerator,
    watch: Option<SessionWatch>,
    session: Option<GameSession>,
    settings: GameSettings,
}

impl GameEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        model: Option<Arc<dyn PromptModel>>,
        deck: ExampleDeck,
    ) -> Self {
        let generator = PromptGenerator::new(model, store.clone(), deck);
        Self {
            store,
            generator,
            watch: None,
            session: None,
            settings: GameSettings::default(),
        }
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.generator.set_offline(offline);
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// The newest prompt in the attached session.
    pub fn current_prompt(&self) -> Option<&str> {
        self.session.as_ref()?.last_prompt()
    }

    pub fn last_store_error(&self) -> Option<&StoreError> {
        self.generator.last_store_error()
    }

    /// Creates a session from the roster (empty names dropped) and attaches
    /// to it.
    pub async fn start_session(&mut self, players: Vec<String>) -> Result<String, EngineError> {
        let players: Vec<String> = players.into_iter().filter(|p| !p.is_empty()).collect();
        if players.is_empty() {
            return Err(EngineError::EmptyRoster);
        }
        let id = self.store.create_session(players).await?;
        self.attach(&id).await?;
        Ok(id)
    }

    /// Subscribes to an existing session and primes the local snapshot.
    pub async fn attach(&mut self, id: &str) -> Result<(), EngineError> {
        let watch = self.store.subscribe(id)?;
        let snapshot = watch.snapshot();
        self.watch = Some(watch);
        self.apply_snapshot(snapshot);
        Ok(())
    }

    /// Waits for the next remote change and folds it in. `None` once the
    /// subscription has ended.
    pub async fn poll(&mut self) -> Option<GameSession> {
        let watch = self.watch.as_mut()?;
        let session = watch.next().await?;
        self.apply_snapshot(session.clone());
        Some(session)
    }

    fn apply_snapshot(&mut self, session: GameSession) {
        let settings = session.settings.clone().unwrap_or_default();
        let roster_changed = self
            .session
            .as_ref()
            .map(|current| current.players != session.players)
            .unwrap_or(true);
        if roster_changed || settings != self.settings {
            self.generator.reset_context(&settings, &session.players);
        }
        self.settings = settings;
        self.session = Some(session);
    }

    /// Generates the next prompt for the attached session. Infallible by
    /// design: with no session attached the static fallback phrase comes
    /// back, and a failed store write is reported via
    /// [`Self::last_store_error`].
    pub async fn next_prompt(&mut self) -> String {
        let Some(session) = self.session.clone() else {
            return OUT_OF_IDEAS.to_string();
        };
        let prompt = self.generator.generate(&session).await;
        let refreshed = self.watch.as_ref().map(SessionWatch::snapshot);
        if let Some(snapshot) = refreshed {
            self.apply_snapshot(snapshot);
        }
        prompt
    }

    /// Adds one penalty for the player at `player_index` and writes the
    /// scores back. An out-of-bounds index is skipped silently: the roster
    /// may have shrunk remotely while the tap was in flight.
    pub async fn increment_penalty(&mut self, player_index: usize) -> Result<(), EngineError> {
        let Some(session) = self.session.as_mut() else {
            return Err(EngineError::NoCurrentSession);
        };
        if !session.bump_score(player_index) {
            return Ok(());
        }
        let id = session.id.clone();
        let scores = session.scores.clone();
        self.store.set_scores(&id, scores).await?;
        Ok(())
    }

    /// Overwrites the session settings; subscribers (this engine included)
    /// pick the change up and rebuild their conversation context.
    pub async fn update_settings(&mut self, settings: GameSettings) -> Result<(), EngineError> {
        let Some(session) = self.session.as_ref() else {
            return Err(EngineError::NoCurrentSession);
        };
        let id = session.id.clone();
        self.store.set_settings(&id, settings.clamped()).await?;
        let refreshed = self.watch.as_ref().map(SessionWatch::snapshot);
        if let Some(snapshot) = refreshed {
            self.apply_snapshot(snapshot);
        }
        Ok(())
    }
}
