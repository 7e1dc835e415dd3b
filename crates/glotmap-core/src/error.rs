//! Error taxonomy shared across the glotmap crates.

use std::path::PathBuf;

use thiserror::Error;

/// Common result type for glotmap operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Raw tag does not have the `ll:text` shape
    #[error("invalid tag format: {0:?} (expected `ll:text`)")]
    InvalidTagFormat(String),

    /// Malformed caller input (empty source list, bad locale string, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Tag not present in the similarity space or mapper sub-table
    #[error("unknown tag: {0:?}")]
    UnknownTag(String),

    /// The precomputed embedding artifact is missing; the mapping
    /// capability cannot start without it
    #[error("embeddings file not found: {0}")]
    EmbeddingsNotFound(PathBuf),

    /// Locale exists in the locale list but has no persisted label
    #[error("no label stored for locale {0:?}")]
    MissingLocaleLabel(String),

    /// No persisted data under the requested entity id
    #[error("no entity stored under id {0}")]
    EntityNotFound(String),

    /// Entity id generation kept colliding past the retry bound.
    /// Collisions this persistent indicate corrupted storage keys.
    #[error("entity id generation still colliding after {0} attempts")]
    IdSpaceExhausted(u32),

    /// Malformed or unreadable corpus input; fatal to an ingestion run
    #[error("corpus error: {0}")]
    Corpus(String),

    /// Name search index failure
    #[error("search index error: {0}")]
    Index(String),

    #[error("storage error: {0}")]
    Store(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
