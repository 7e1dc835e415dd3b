//! Typed read accessors over the persisted schema.
//!
//! Thin wrappers consumed by the API layer and by the mapper's tag
//! provider; all hard logic lives elsewhere.

use serde::Serialize;

use glotmap_core::{EntityId, Error, Locale, Result};

use crate::{keys, Store};

/// A known language as a `(locale, label)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Language {
    pub locale: Locale,
    pub label: String,
}

pub struct Languages;

impl Languages {
    /// Known locales, in ingestion order.
    pub fn locales(store: &dyn Store) -> Vec<Locale> {
        store
            .list(keys::LOCALES)
            .iter()
            .filter_map(|code| Locale::new(code).ok())
            .collect()
    }

    /// Display label for a locale.
    pub fn label(store: &dyn Store, locale: &Locale) -> Result<String> {
        store
            .get(&keys::locale_label(locale))
            .ok_or_else(|| Error::MissingLocaleLabel(locale.as_str().to_string()))
    }

    /// All known languages with their labels.
    pub fn all(store: &dyn Store) -> Result<Vec<Language>> {
        Self::locales(store)
            .into_iter()
            .map(|locale| {
                let label = Self::label(store, &locale)?;
                Ok(Language { locale, label })
            })
            .collect()
    }
}

pub struct TagSets;

impl TagSets {
    /// A locale's full raw-tag vocabulary, sorted.
    pub fn for_locale(store: &dyn Store, locale: &Locale) -> Vec<String> {
        store.members(&keys::tag_set(locale))
    }

    /// Raw tags of one `(entity, locale)` pair, in corpus order.
    pub fn for_entity(store: &dyn Store, eid: &EntityId, locale: &Locale) -> Vec<String> {
        store.list(&keys::entity_tags(eid, locale))
    }
}

/// Per-locale view of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedEntity {
    pub locale: Locale,
    pub uri: String,
    pub tags: Vec<String>,
}

pub struct Entities;

impl Entities {
    /// Every localized view persisted for an entity.
    ///
    /// Fails with [`Error::EntityNotFound`] when no locale has data for
    /// the id.
    pub fn get(store: &dyn Store, eid: &EntityId) -> Result<Vec<LocalizedEntity>> {
        let views: Vec<LocalizedEntity> = Languages::locales(store)
            .into_iter()
            .filter_map(|locale| {
                store.get(&keys::entity_uri(eid, &locale)).map(|uri| LocalizedEntity {
                    tags: TagSets::for_entity(store, eid, &locale),
                    locale,
                    uri,
                })
            })
            .collect();
        if views.is_empty() {
            return Err(Error::EntityNotFound(eid.to_string()));
        }
        Ok(views)
    }
}
