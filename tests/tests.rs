use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;

use partyline::*;

fn players(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn test_deck() -> ExampleDeck {
    ExampleDeck::new(vec![
        "Deck prompt one.".to_string(),
        "Deck prompt two.".to_string(),
        "Deck prompt three.".to_string(),
    ])
}

/// A model stub that always answers with the same text and counts its calls.
struct FixedModel {
    reply: String,
    calls: AtomicUsize,
}

impl FixedModel {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PromptModel for FixedModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AIError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// A model stub that always fails, as a dead transport would.
struct FailingModel;

#[async_trait]
impl PromptModel for FailingModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AIError> {
        Err(AIError::Timeout)
    }
}

/// Wraps a MemoryStore and counts prompt appends.
struct CountingStore {
    inner: MemoryStore,
    appends: AtomicUsize,
}

impl CountingStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            appends: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn create_session(&self, players: Vec<String>) -> Result<String, StoreError> {
        self.inner.create_session(players).await
    }

    async fn get_session(&self, id: &str) -> Result<GameSession, StoreError> {
        self.inner.get_session(id).await
    }

    async fn append_prompt(&self, id: &str, prompt: &str) -> Result<(), StoreError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.inner.append_prompt(id, prompt).await
    }

    async fn set_scores(&self, id: &str, scores: Vec<u32>) -> Result<(), StoreError> {
        self.inner.set_scores(id, scores).await
    }

    async fn set_players(&self, id: &str, players: Vec<String>) -> Result<(), StoreError> {
        self.inner.set_players(id, players).await
    }

    async fn set_settings(&self, id: &str, settings: GameSettings) -> Result<(), StoreError> {
        self.inner.set_settings(id, settings).await
    }

    fn subscribe(&self, id: &str) -> Result<SessionWatch, StoreError> {
        self.inner.subscribe(id)
    }
}

#[test]
fn test_substitution_assigns_distinct_names() {
    let mut rng = StdRng::seed_from_u64(7);
    let roster = players(&["Ann", "Bo", "Cal"]);
    let result = substitute_names("*name and *name2 drink!", &roster, &mut rng);

    assert!(!result.contains('*'));
    let mut seen: Vec<&str> = roster
        .iter()
        .map(String::as_str)
        .filter(|name| result.contains(*name))
        .collect();
    seen.dedup();
    assert_eq!(seen.len(), 2, "expected two distinct names in {result:?}");
}

#[test]
fn test_substitution_without_placeholders_is_identity() {
    let mut rng = StdRng::seed_from_u64(1);
    let roster = players(&["Ann"]);
    assert_eq!(
        substitute_names("no placeholders", &roster, &mut rng),
        "no placeholders"
    );
}

#[test]
fn test_substitution_repeats_names_when_players_run_out() {
    let mut rng = StdRng::seed_from_u64(3);
    let roster = players(&["Solo"]);
    let result = substitute_names("*name challenges *name2!", &roster, &mut rng);
    assert_eq!(result, "Solo challenges Solo!");
}

#[test]
fn test_substitution_replaces_every_occurrence() {
    let mut rng = StdRng::seed_from_u64(5);
    let roster = players(&["Ann"]);
    let result = substitute_names("*name drinks, then *name sings.", &roster, &mut rng);
    assert_eq!(result, "Ann drinks, then Ann sings.");
}

#[test]
fn test_prompt_type_display_matches_catalog() {
    assert_eq!(PromptType::VotingGame.to_string(), "voting game");
    assert_eq!(PromptType::RolePlay.to_string(), "role-play");
}

#[test]
fn test_history_prefix_shape() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut history = ConversationHistory::new();
    let deck = test_deck();
    let settings = GameSettings::default();
    let roster = players(&["Ann", "Bo"]);

    history.rebuild_prefix(&settings, &roster, &deck, &mut rng);
    let messages = history.request_messages("go");

    // One system message, a user/assistant pair per deck example, and the
    // fresh instruction turn.
    assert_eq!(messages.len(), 1 + 2 * deck.len() + 1);
    assert_eq!(messages[0].role, ChatRole::System);
    let last = messages.last().unwrap();
    assert_eq!(last.role, ChatRole::User);
    assert_eq!(last.content, "go");
}

#[tokio::test]
async fn test_generate_returns_non_empty_for_non_empty_roster() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(players(&["Ann", "Bo"])).await.unwrap();
    let session = store.get_session(&id).await.unwrap();

    let mut generator =
        PromptGenerator::with_rng(None, store, test_deck(), StdRng::seed_from_u64(2));
    let prompt = generator.generate(&session).await;
    assert!(!prompt.is_empty());
}

#[tokio::test]
async fn test_empty_roster_yields_fallback_without_store_write() {
    let store = CountingStore::new();
    let session = GameSession::new("ghost", Vec::new());

    let mut generator = PromptGenerator::with_rng(
        None,
        store.clone(),
        test_deck(),
        StdRng::seed_from_u64(4),
    );
    let prompt = generator.generate(&session).await;

    assert_eq!(prompt, OUT_OF_IDEAS);
    assert_eq!(store.appends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ai_retry_bound_then_deck_fallback() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(players(&["Ann", "Bo"])).await.unwrap();
    store.append_prompt(&id, "Old news.").await.unwrap();
    let session = store.get_session(&id).await.unwrap();

    // The model keeps repeating a prompt the session has already used.
    let model = FixedModel::new("Old news.");
    let mut generator = PromptGenerator::with_rng(
        Some(model.clone()),
        store,
        test_deck(),
        StdRng::seed_from_u64(9),
    );

    let policy = GenerationPolicy {
        target_single_player: false,
        use_player_details: false,
        use_ai: true,
    };
    let prompt = generator.generate_with_policy(&session, policy).await;

    assert_eq!(model.calls.load(Ordering::SeqCst), MAX_AI_ATTEMPTS);
    assert!(!prompt.is_empty());
    assert_ne!(prompt, "Old news.");
    assert!(test_deck().prompts().contains(&prompt));
}

#[tokio::test]
async fn test_model_failure_is_swallowed() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(players(&["Ann"])).await.unwrap();
    let session = store.get_session(&id).await.unwrap();

    let mut generator = PromptGenerator::with_rng(
        Some(Arc::new(FailingModel)),
        store,
        test_deck(),
        StdRng::seed_from_u64(13),
    );
    let policy = GenerationPolicy {
        target_single_player: false,
        use_player_details: false,
        use_ai: true,
    };
    let prompt = generator.generate_with_policy(&session, policy).await;

    assert!(!prompt.is_empty());
    assert!(test_deck().prompts().contains(&prompt));
}

#[tokio::test]
async fn test_rolling_window_stays_bounded() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(players(&["Ann", "Bo"])).await.unwrap();
    let session = store.get_session(&id).await.unwrap();

    let mut generator =
        PromptGenerator::with_rng(None, store, test_deck(), StdRng::seed_from_u64(21));
    for _ in 0..5 {
        generator.generate(&session).await;
    }
    assert_eq!(generator.history().rolling_len(), ROLLING_WINDOW);
}

#[tokio::test]
async fn test_deck_exhaustion_triggers_reshuffled_refill() {
    let deck = ExampleDeck::new(vec![
        "Tiny deck A.".to_string(),
        "Tiny deck B.".to_string(),
    ]);
    let store = Arc::new(MemoryStore::new());
    let id = store.create_session(players(&["Ann"])).await.unwrap();
    let session = store.get_session(&id).await.unwrap();

    let mut generator =
        PromptGenerator::with_rng(None, store, deck.clone(), StdRng::seed_from_u64(17));
    let policy = GenerationPolicy {
        target_single_player: false,
        use_player_details: false,
        use_ai: false,
    };

    // Two draws empty the working copy; the third must refill, not go blank.
    for _ in 0..3 {
        let prompt = generator.generate_with_policy(&session, policy).await;
        assert!(!prompt.is_empty());
        assert!(deck.prompts().contains(&prompt));
    }
}

#[tokio::test]
async fn test_offline_end_to_end_single_append() {
    let store = CountingStore::new();
    let id = store.create_session(players(&["Ann", "Bo"])).await.unwrap();
    let session = store.get_session(&id).await.unwrap();

    // A live model is wired up, but offline mode must keep it untouched.
    let model = FixedModel::new("Should never be used.");
    let mut generator = PromptGenerator::with_rng(
        Some(model.clone()),
        store.clone(),
        test_deck(),
        StdRng::seed_from_u64(29),
    );
    generator.set_offline(true);

    let prompt = generator.generate(&session).await;

    assert!(!prompt.is_empty());
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.appends.load(Ordering::SeqCst), 1);
    let stored = store.get_session(&id).await.unwrap();
    assert_eq!(stored.prompts, vec![prompt]);
}

#[tokio::test]
async fn test_store_write_failure_is_reported_not_raised() {
    let store = Arc::new(MemoryStore::new());
    // A session the store has never heard of.
    let session = GameSession::new("missing", players(&["Ann"]));

    let mut generator =
        PromptGenerator::with_rng(None, store, test_deck(), StdRng::seed_from_u64(31));
    let prompt = generator.generate(&session).await;

    assert!(!prompt.is_empty());
    assert!(matches!(
        generator.last_store_error(),
        Some(StoreError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn test_memory_store_append_is_union() {
    let store = MemoryStore::new();
    let id = store.create_session(players(&["Ann"])).await.unwrap();

    store.append_prompt(&id, "Same prompt.").await.unwrap();
    store.append_prompt(&id, "Same prompt.").await.unwrap();

    let session = store.get_session(&id).await.unwrap();
    assert_eq!(session.prompts, vec!["Same prompt.".to_string()]);
}

#[tokio::test]
async fn test_subscription_sees_remote_changes() {
    let store = MemoryStore::new();
    let id = store.create_session(players(&["Ann"])).await.unwrap();

    let mut watch = store.subscribe(&id).unwrap();
    assert_eq!(watch.snapshot().players, players(&["Ann"]));

    store
        .set_players(&id, players(&["Ann", "Bo"]))
        .await
        .unwrap();
    let session = watch.next().await.unwrap();
    assert_eq!(session.players, players(&["Ann", "Bo"]));
}

#[test]
fn test_bump_score_tolerates_roster_mismatch() {
    let mut session = GameSession::new("s", players(&["Ann", "Bo"]));
    // A roster edit mid round-trip: more players than scores.
    session.scores = vec![0];

    assert!(session.bump_score(0));
    assert!(!session.bump_score(1));
    assert_eq!(session.scores, vec![1]);
}

#[tokio::test]
async fn test_engine_penalty_roundtrip() {
    let store = Arc::new(MemoryStore::new());
    let mut engine = GameEngine::new(store.clone(), None, test_deck());

    let id = engine
        .start_session(players(&["Ann", "Bo", ""]))
        .await
        .unwrap();
    engine.increment_penalty(0).await.unwrap();
    engine.increment_penalty(99).await.unwrap(); // out of bounds, skipped

    let session = store.get_session(&id).await.unwrap();
    assert_eq!(session.players, players(&["Ann", "Bo"]));
    assert_eq!(session.scores, vec![1, 0]);
}

#[tokio::test]
async fn test_engine_refuses_empty_roster() {
    let store = Arc::new(MemoryStore::new());
    let mut engine = GameEngine::new(store, None, test_deck());

    let result = engine.start_session(players(&["", ""])).await;
    assert!(matches!(result, Err(EngineError::EmptyRoster)));
}

#[tokio::test]
async fn test_engine_prompt_lands_in_session() {
    let store = Arc::new(MemoryStore::new());
    let mut engine = GameEngine::new(store.clone(), None, test_deck());
    engine.set_offline(true);

    let id = engine.start_session(players(&["Ann", "Bo"])).await.unwrap();
    let prompt = engine.next_prompt().await;

    assert!(!prompt.is_empty());
    assert_eq!(engine.current_prompt(), Some(prompt.as_str()));
    let session = store.get_session(&id).await.unwrap();
    assert_eq!(session.prompts, vec![prompt]);
}

#[tokio::test]
async fn test_engine_settings_update_propagates() {
    let store = Arc::new(MemoryStore::new());
    let mut engine = GameEngine::new(store.clone(), None, test_deck());

    let id = engine.start_session(players(&["Ann"])).await.unwrap();
    let settings = GameSettings {
        explicitness: 9, // out of range, must come back clamped
        theme: "Holiday".to_string(),
        ..GameSettings::default()
    };
    engine.update_settings(settings).await.unwrap();

    let session = store.get_session(&id).await.unwrap();
    let stored = session.settings.unwrap();
    assert_eq!(stored.theme, "Holiday");
    assert_eq!(stored.explicitness, 5);
}

#[test]
fn test_session_snapshot_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let path = path.to_str().unwrap();

    let mut session = GameSession::new("local", players(&["Ann", "Bo"]));
    session.prompts.push("Deck prompt one.".to_string());
    session.scores = vec![2, 1];

    session.save_to_file(path).unwrap();
    let loaded = GameSession::load_from_file(path).unwrap();
    assert_eq!(loaded, session);
}

#[test]
fn test_config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let path = path.to_str().unwrap();

    let config = AppConfig {
        openai_api_key: Some("sk-test".to_string()),
        offline: true,
        ..AppConfig::default()
    };
    config.save_to_file(path).unwrap();

    let loaded = AppConfig::load_from_file(path).unwrap();
    assert_eq!(loaded.openai_api_key.as_deref(), Some("sk-test"));
    assert!(loaded.offline);
    assert_eq!(loaded.model, DEFAULT_MODEL);
}

#[test]
fn test_builtin_deck_loads_and_categorizes() {
    let deck = ExampleDeck::builtin();
    assert!(!deck.is_empty());
    // Categorized styles draw from their sub-list, others from the full deck.
    assert!(deck.for_type(PromptType::Trivia).len() < deck.len());
    for prompt in deck.for_type(PromptType::Trivia) {
        assert!(deck.prompts().contains(prompt));
    }
}
