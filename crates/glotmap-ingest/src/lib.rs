//! Glotmap corpus ingestion
//!
//! One-time batch pipeline that consumes the raw per-entity tag and URI
//! corpora and produces the durable artifacts the runtime depends on:
//! the locale vocabulary, per-locale tag sets, per-(entity, locale) tag
//! lists, and the entity-name search index.
//!
//! The pipeline runs as three independently checkpointed phases
//! (languages -> tags -> entities) guarded by a completion marker; see
//! [`Ingestor`].

pub mod corpus;
pub mod pipeline;

pub use corpus::{load_entity_corpus, load_languages, load_tag_corpus, EntityCorpus, TagCorpus};
pub use pipeline::{IngestReport, Ingestor, MAX_EID_ATTEMPTS};
