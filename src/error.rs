use thiserror::Error;

/// Errors raised by the story player and its collaborators.
#[derive(Debug, Error)]
pub enum StoryError {
    /// A caller asked for a story index outside the current sequence.
    #[error("invariant violation: index {index} out of range for {len} stories")]
    InvariantViolation { index: usize, len: usize },

    #[error("failed to read content from {path}: {source}")]
    ContentIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse content: {0}")]
    ContentParse(#[from] serde_json::Error),

    /// The document parsed, but held no hero slider object.
    #[error("content document has no hero slider object")]
    MissingContent,

    #[error("media error: {0}")]
    Media(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoryError>;
