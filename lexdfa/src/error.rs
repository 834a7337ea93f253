//! Error type shared by every stage of the compile pipeline.
//!
//! Compilation either succeeds or fails as a whole; matching never fails (a
//! missing transition simply means "no match").

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DfaError>;

/// Errors produced while resolving a grammar, building automata, or
/// loading a persisted DFA.
#[derive(Debug, Error)]
pub enum DfaError {
    /// The grammar has no definitions, or the start symbol resolved to an
    /// empty pattern.
    #[error("empty pattern")]
    EmptyPattern,

    /// Unbalanced grouping, a dangling operator, or an operand stack that
    /// ran dry during NFA construction. `position` is the symbol index in
    /// the tokenized pattern.
    #[error("malformed pattern at symbol {position}: {message}")]
    MalformedPattern { position: usize, message: String },

    /// A name-like token in a definition body matches no definition.
    #[error("undefined reference '{name}' in definition '{definition}'")]
    UndefinedReference { name: String, definition: String },

    /// A definition reaches itself through its references.
    #[error("definition '{name}' references itself")]
    CyclicReference { name: String },

    /// A non-blank grammar line without a `->` separator or with an empty name.
    #[error("malformed definition on line {line}: '{text}'")]
    MalformedDefinition { line: usize, text: String },

    /// The same name was defined twice.
    #[error("duplicate definition '{name}'")]
    DuplicateDefinition { name: String },

    /// Persisted DFA text does not have the expected shape. `line` is
    /// 1-based.
    #[error("DFA import error on line {line}: {message}")]
    ImportFormat { line: usize, message: String },

    /// Determinization produced more states than the configured limit.
    #[error("DFA exceeds the configured limit of {limit} states")]
    StateLimitExceeded { limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DfaError {
    pub(crate) fn malformed(position: usize, message: impl Into<String>) -> Self {
        DfaError::MalformedPattern { position, message: message.into() }
    }

    pub(crate) fn import(line: usize, message: impl Into<String>) -> Self {
        DfaError::ImportFormat { line, message: message.into() }
    }
}
