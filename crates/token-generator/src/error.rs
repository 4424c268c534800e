//! Error types for offset resolution and replacement generation.

/// Errors surfaced by the substitution engine.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token pattern is absent from the event. `replace` absorbs this.
    #[error("Token '{token}' not found in field '{field}'")]
    NotFound { token: String, field: String },

    /// Regular expression failed to compile
    #[error("Invalid pattern for token '{token}': {source}")]
    Pattern {
        token: String,
        #[source]
        source: regex::Error,
    },

    /// Token parameters cannot produce a value
    #[error("Invalid token '{token}' in sample '{sample}': {reason}")]
    InvalidToken {
        sample: String,
        token: String,
        reason: String,
    },

    /// Shared choice slot holds an index outside this token's list
    #[error("Choice index {index} out of range for token '{token}' with {len} entries")]
    ChoiceOutOfRange {
        token: String,
        index: i64,
        len: usize,
    },

    /// Instant cannot be represented as nanoseconds since the epoch
    #[error("Timestamp for token '{token}' is outside the representable range")]
    TimestampOutOfRange { token: String },

    /// Sample has no template lines to render
    #[error("Sample '{0}' has no lines")]
    NoLines(String),
}

impl TokenError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Fault raised inside the script sandbox.
///
/// Never escapes replacement generation; it is logged and the replacement
/// becomes empty.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Lua runtime or syntax error
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),
}
