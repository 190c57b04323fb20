use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::StoreError;
use crate::session::GameSession;
use crate::settings::GameSettings;

/// The document store holding authoritative session state. `append_prompt`
/// carries array-union semantics: appending a value already present in the
/// list is a no-op at the storage layer, independent of the generator's own
/// duplicate avoidance.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a session with zeroed scores and returns its assigned id.
    async fn create_session(&self, players: Vec<String>) -> Result<String, StoreError>;

    async fn get_session(&self, id: &str) -> Result<GameSession, StoreError>;

    async fn append_prompt(&self, id: &str, prompt: &str) -> Result<(), StoreError>;

    async fn set_scores(&self, id: &str, scores: Vec<u32>) -> Result<(), StoreError>;

    async fn set_players(&self, id: &str, players: Vec<String>) -> Result<(), StoreError>;

    async fn set_settings(&self, id: &str, settings: GameSettings) -> Result<(), StoreError>;

    /// Subscribes to remote changes. Dropping the returned handle
    /// unsubscribes.
    fn subscribe(&self, id: &str) -> Result<SessionWatch, StoreError>;
}

/// A cancellable subscription yielding session snapshots as they change.
pub struct SessionWatch {
    receiver: watch::Receiver<GameSession>,
}

impl SessionWatch {
    /// The most recent snapshot, without waiting.
    pub fn snapshot(&self) -> GameSession {
        self.receiver.borrow().clone()
    }

    /// Waits for the next change and returns the new snapshot, or `None`
    /// once the store side has gone away.
    pub async fn next(&mut self) -> Option<GameSession> {
        match self.receiver.changed().await {
            Ok(()) => Some(self.receiver.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

struct StoreEntry {
    session: GameSession,
    sender: watch::Sender<GameSession>,
}

/// In-process store used for offline play, the demo binary, and tests.
/// Carries the same append/set/subscribe semantics the crate expects from a
/// cloud document store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, StoreEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(
        &self,
        id: &str,
        apply: impl FnOnce(&mut GameSession),
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("session store lock poisoned");
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        apply(&mut entry.session);
        entry.sender.send_replace(entry.session.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, players: Vec<String>) -> Result<String, StoreError> {
        let players: Vec<String> = players.into_iter().filter(|p| !p.is_empty()).collect();
        if players.is_empty() {
            return Err(StoreError::Invalid("no players".to_string()));
        }
        let id = Uuid::new_v4().to_string();
        let session = GameSession::new(id.clone(), players);
        let (sender, _) = watch::channel(session.clone());
        let mut entries = self.entries.lock().expect("session store lock poisoned");
        entries.insert(id.clone(), StoreEntry { session, sender });
        Ok(id)
    }

    async fn get_session(&self, id: &str) -> Result<GameSession, StoreError> {
        let entries = self.entries.lock().expect("session store lock poisoned");
        entries
            .get(id)
            .map(|entry| entry.session.clone())
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))
    }

    async fn append_prompt(&self, id: &str, prompt: &str) -> Result<(), StoreError> {
        self.update(id, |session| {
            // Array-union: identical values are not duplicated.
            if !session.prompts.iter().any(|p| p == prompt) {
                session.prompts.push(prompt.to_string());
            }
        })
    }

    async fn set_scores(&self, id: &str, scores: Vec<u32>) -> Result<(), StoreError> {
        self.update(id, |session| session.scores = scores)
    }

    async fn set_players(&self, id: &str, players: Vec<String>) -> Result<(), StoreError> {
        self.update(id, |session| session.players = players)
    }

    async fn set_settings(&self, id: &str, settings: GameSettings) -> Result<(), StoreError> {
        self.update(id, |session| session.settings = Some(settings))
    }

    fn subscribe(&self, id: &str) -> Result<SessionWatch, StoreError> {
        let entries = self.entries.lock().expect("session store lock poisoned");
        let entry = entries
            .get(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        Ok(SessionWatch {
            receiver: entry.sender.subscribe(),
        })
    }
}
