use thiserror::Error;

/// Errors produced while turning actions into their wire form and back.
///
/// These are local and recoverable. Inside an episode step they are
/// swallowed (the step is spent, nothing else happens); everywhere else they
/// are returned to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unknown operation name: {0}")]
    InvalidOperationName(String),

    #[error("Invalid operation code: {0} (expected 1-4)")]
    InvalidOperationCode(u64),

    #[error("Malformed face identifier: {0:?}")]
    MalformedIdentifier(String),

    #[error("Mixed identifier kinds: start={start}, end={end}")]
    MixedIdentifierKinds { start: String, end: String },

    #[error("UUID pair has zero upper halves and would decode as integer ids")]
    AmbiguousIdentifier,

    #[error("Encoded action must have 5 slots, got {0}")]
    WrongActionWidth(usize),
}

/// Failures reported by (or while talking to) the remote geometry engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("[{command}] engine returned status {status}")]
    Status { command: String, status: u16 },

    #[error("[{command}] response field missing: {field}")]
    MissingField { command: String, field: String },

    #[error("Face not found in target: {0}")]
    UnknownFace(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl EngineError {
    pub fn status(command: &str, status: u16) -> Self {
        Self::Status {
            command: command.to_string(),
            status,
        }
    }

    pub fn missing(command: &str, field: &str) -> Self {
        Self::MissingField {
            command: command.to_string(),
            field: field.to_string(),
        }
    }
}

/// Result type for engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the episode loop.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The engine did not acknowledge the revert. Every later episode would
    /// start from a dirty baseline, so this one is fatal.
    #[error("Failed to revert engine to target: {0}")]
    RemoteRevert(#[source] EngineError),

    #[error("Remote call failed: {0}")]
    RemoteCall(#[from] EngineError),

    #[error("Episode already finished at step {step}; call reset() first")]
    EpisodeAlreadyFinished { step: u64 },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("No target has been set on the engine")]
    NoTarget,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid bounding box: min > max on axis {axis}")]
    InvalidBoundingBox { axis: char },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
