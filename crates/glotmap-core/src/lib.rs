//! Glotmap core types
//!
//! Shared vocabulary for the cross-lingual tag mapping pipeline:
//! - Locale-qualified tag types (`RawTag`, `NormalizedTag`) and entity ids
//! - The tag normalizer (charset scrubbing + Japanese segmentation)
//! - Encyclopedia URI name extraction
//! - Error taxonomy and process configuration

pub mod config;
pub mod error;
pub mod normalize;
pub mod segment;
pub mod types;
pub mod uri;

pub use config::Config;
pub use error::{Error, Result};
pub use normalize::normalize;
pub use types::{EntityId, Locale, NormalizedTag, RawTag};
