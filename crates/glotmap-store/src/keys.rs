//! Key schema helpers.
//!
//! Every key written to the store is built here so the schema lives in
//! one place.

use glotmap_core::{EntityId, Locale};

/// Ordered list of known locale codes.
pub const LOCALES: &str = "locales";

pub fn locale_label(locale: &Locale) -> String {
    format!("locale:{locale}")
}

pub fn entity_uri(eid: &EntityId, locale: &Locale) -> String {
    format!("{eid}:{locale}")
}

pub fn entity_tags(eid: &EntityId, locale: &Locale) -> String {
    format!("{eid}:{locale}:tags")
}

/// Per-locale tag vocabulary (set of raw tags).
pub fn tag_set(locale: &Locale) -> String {
    format!("tags:{locale}")
}

/// Ingestion phase checkpoint.
pub fn ingest_phase(name: &str) -> String {
    format!("ingest:phase:{name}")
}

/// External corpus key -> generated entity id. Lets a resumed entity
/// phase reuse ids instead of minting duplicates.
pub fn xref(external: &str) -> String {
    format!("xref:{external}")
}
