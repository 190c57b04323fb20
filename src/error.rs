use thiserror::Error;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("AI error: {0}")]
    AI(#[from] AIError), // Errors related to the text-generation service.

    #[error("Store error: {0}")]
    Store(#[from] StoreError), // Errors from the session store.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error), // Errors related to data serialization.

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error), // Input/output errors.

    #[error("No current session")]
    NoCurrentSession, // Error when no game session is attached.

    #[error("Empty player roster")]
    EmptyRoster, // Error when a session is started without any valid player name.
}

// Errors related to the text-generation call are separated into their own enum.
// The prompt generator swallows all of these; they only surface through logs
// and through callers that talk to the model directly.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Timeout occurred")]
    Timeout, // The completion call exceeded its time bound.

    #[error("Empty completion")]
    EmptyCompletion, // The model answered with no usable text.
}

// Errors from the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid session: {0}")]
    Invalid(String),

    #[error("Store write failed: {0}")]
    WriteFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}
