pub mod ai;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod generator;
pub mod history;
pub mod logging;
pub mod message;
pub mod prompt_type;
pub mod session;
pub mod settings;
pub mod store;
pub mod substitute;

// Re-export commonly used items for easier access
pub use ai::{DEFAULT_MODEL, OpenAIPromptModel, PromptModel};
pub use config::AppConfig;
pub use deck::ExampleDeck;
pub use engine::GameEngine;
pub use error::{AIError, EngineError, StoreError};
pub use generator::{GenerationPolicy, MAX_AI_ATTEMPTS, OUT_OF_IDEAS, PromptGenerator};
pub use history::{ConversationHistory, REQUEST_TAIL, ROLLING_WINDOW};
pub use message::{ChatMessage, ChatRole};
pub use prompt_type::PromptType;
pub use session::GameSession;
pub use settings::GameSettings;
pub use store::{MemoryStore, SessionStore, SessionWatch};
pub use substitute::substitute_names;
