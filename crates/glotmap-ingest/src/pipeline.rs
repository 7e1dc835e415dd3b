//! Phased batch ingestion pipeline.
//!
//! Single-threaded, single-run: the pipeline assumes exclusive ownership
//! of the store and search index while it runs. Each phase checkpoints
//! itself in the store and flushes, so a crashed run resumes from the
//! first incomplete phase; the completion marker file makes the whole
//! batch a no-op afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use tracing::{debug, error, info, warn};

use glotmap_core::{uri, Config, EntityId, Error, Locale, Result};
use glotmap_search::NameIndex;
use glotmap_store::{keys, Languages, Store};

use crate::corpus::{self, EntityCorpus, TagCorpus};

/// Upper bound on entity-id collision retries. uuid4 collisions are
/// vanishingly rare; hitting this bound means the storage keys are
/// corrupted, not that we are unlucky.
pub const MAX_EID_ATTEMPTS: u32 = 64;

/// What a run actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// True when the completion marker was already present.
    pub skipped: bool,
    pub languages: usize,
    pub tags: usize,
    pub entities: usize,
}

/// The batch ingestor. Borrows the store; owns nothing durable itself.
pub struct Ingestor<'a> {
    store: &'a dyn Store,
    config: &'a Config,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a dyn Store, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Run the full batch: languages -> tag vocabulary -> entities,
    /// then write the completion marker.
    ///
    /// Corpus errors are fatal and leave the marker unwritten so a retry
    /// is possible; completed phases are not repeated on retry.
    pub fn run(&self) -> Result<IngestReport> {
        let marker = self.config.ingestion_marker();
        if marker.exists() {
            warn!(marker = %marker.display(), "ingestion marker present, skipping run");
            return Ok(IngestReport {
                skipped: true,
                ..IngestReport::default()
            });
        }

        let mut report = IngestReport::default();

        info!("loading language list");
        let languages = corpus::load_languages(&self.config.languages())?;
        report.languages = languages.len();

        info!("loading tag corpus");
        let tag_corpus = corpus::load_tag_corpus(&self.config.tag_corpus())?;

        self.phase("languages", |this| {
            this.ingest_languages(&languages);
            Ok(())
        })?;

        self.phase("tags", |this| {
            report.tags = this.ingest_tags(&tag_corpus);
            Ok(())
        })?;

        info!("loading entity corpus");
        let entity_corpus = corpus::load_entity_corpus(&self.config.entity_corpus())?;

        self.phase("entities", |this| {
            report.entities = this.ingest_entities(&tag_corpus, &entity_corpus)?;
            Ok(())
        })?;

        fs::write(&marker, "ingested")?;
        info!(marker = %marker.display(), "ingestion complete");
        Ok(report)
    }

    /// Run one phase unless its checkpoint says it already completed,
    /// then checkpoint and flush.
    fn phase(&self, name: &str, body: impl FnOnce(&Self) -> Result<()>) -> Result<()> {
        let checkpoint = keys::ingest_phase(name);
        if self.store.get(&checkpoint).as_deref() == Some("done") {
            info!(phase = name, "phase already complete, skipping");
            return Ok(());
        }
        info!(phase = name, "phase start");
        body(self)?;
        self.store.set(&checkpoint, "done");
        self.store.flush()?;
        info!(phase = name, "phase complete");
        Ok(())
    }

    /// Persist the locale list and display labels. Idempotent: locales
    /// already in the list are not appended again.
    fn ingest_languages(&self, languages: &[(Locale, String)]) {
        let existing = self.store.list(keys::LOCALES);
        for (locale, label) in languages {
            debug!(%locale, label, "ingest language");
            if !existing.iter().any(|code| code == locale.as_str()) {
                self.store.push(keys::LOCALES, locale.as_str());
            }
            self.store.set(&keys::locale_label(locale), label);
        }
    }

    /// Flatten the tag corpus into per-locale vocabulary sets.
    fn ingest_tags(&self, tag_corpus: &TagCorpus) -> usize {
        let mut count = 0;
        for tagsets in tag_corpus.values() {
            for (locale, tags) in tagsets {
                let key = keys::tag_set(locale);
                for tag in tags {
                    self.store.add(&key, tag);
                    count += 1;
                }
            }
        }
        count
    }

    /// Persist every entity present in both corpora: URIs per locale,
    /// raw tag lists per (entity, locale), and one name-search document
    /// per distinct display name.
    ///
    /// Entities only present in the entity corpus are skipped silently;
    /// the tag corpus is the roster.
    fn ingest_entities(
        &self,
        tag_corpus: &TagCorpus,
        entity_corpus: &EntityCorpus,
    ) -> Result<usize> {
        let supported = Languages::locales(self.store);
        let index = NameIndex::create(&self.config.index_dir, &supported)?;

        let mut count = 0;
        for (external, uris) in entity_corpus {
            let Some(tagsets) = tag_corpus.get(external) else {
                continue;
            };

            // A resumed run reuses the id minted before the crash so the
            // same external entity never exists twice.
            let xref_key = keys::xref(external);
            let (eid, resumed) = match self.store.get(&xref_key) {
                Some(id) => (EntityId::parse(&id)?, true),
                None => (self.generate_eid(&supported)?, false),
            };

            let mut names = BTreeSet::new();
            for (locale, uri) in uris {
                names.insert(uri::display_name(uri));
                self.store.set(&keys::entity_uri(&eid, locale), uri);
            }

            let with_tags: BTreeSet<&Locale> = tagsets
                .iter()
                .filter(|&(locale, tags)| supported.contains(locale) && !tags.is_empty())
                .map(|(locale, _)| locale)
                .collect();
            let onehot: BTreeMap<Locale, bool> = supported
                .iter()
                .map(|locale| (locale.clone(), with_tags.contains(locale)))
                .collect();

            for name in &names {
                index.add_name(name, &eid, &onehot)?;
            }

            for (locale, tags) in tagsets {
                let key = keys::entity_tags(&eid, locale);
                if resumed && !self.store.list(&key).is_empty() {
                    continue;
                }
                for tag in tags {
                    self.store.push(&key, tag);
                }
            }

            self.store.set(&xref_key, eid.as_str());
            count += 1;
        }

        index.commit()?;
        Ok(count)
    }

    /// Generate an entity id that collides with no persisted key in any
    /// known locale, retrying up to [`MAX_EID_ATTEMPTS`] times.
    fn generate_eid(&self, locales: &[Locale]) -> Result<EntityId> {
        for attempt in 0..MAX_EID_ATTEMPTS {
            let eid = EntityId::generate();
            let collides = locales
                .iter()
                .any(|locale| self.store.exists(&keys::entity_uri(&eid, locale)));
            if !collides {
                if attempt > 0 {
                    warn!(attempt, "entity id collision resolved after retries");
                }
                return Ok(eid);
            }
        }
        error!(
            attempts = MAX_EID_ATTEMPTS,
            "entity id generation kept colliding; storage keys look corrupted"
        );
        Err(Error::IdSpaceExhausted(MAX_EID_ATTEMPTS))
    }
}
