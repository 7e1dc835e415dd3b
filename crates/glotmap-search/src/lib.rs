//! Entity-name search index.
//!
//! One document per distinct entity display name: an ngram-tokenized copy
//! of the name for substring matching, the stored raw name and entity id,
//! and one boolean flag per known locale meaning "entity has at least one
//! tag in this locale". Ingestion writes; the API layer reads.
//!
//! Strategy: ngram tokenization at index time (not query time) so
//! substring lookups stay cheap; trigrams with lowercasing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use parking_lot::Mutex;
use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::schema::{
    FieldType, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, INDEXED, STORED,
};
use tantivy::tokenizer::{LowerCaser, NgramTokenizer, TextAnalyzer};
use tantivy::query::QueryParser;
use tantivy::{Index, IndexWriter, TantivyDocument};

use glotmap_core::{EntityId, Error, Locale, Result};

/// Custom tokenizer name for ngram-based substring search.
const NGRAM_TOKENIZER: &str = "ngram3";

/// A scored name match.
#[derive(Debug, Clone)]
pub struct NameHit {
    pub name: String,
    pub eid: String,
    /// Locales in which the entity has at least one tag.
    pub locales: Vec<String>,
    pub score: f32,
}

/// Tantivy-backed index over entity display names.
pub struct NameIndex {
    index: Index,
    ngram_field: tantivy::schema::Field,
    name_field: tantivy::schema::Field,
    eid_field: tantivy::schema::Field,
    /// Locale code -> boolean flag field.
    locale_fields: BTreeMap<String, tantivy::schema::Field>,
    writer: Option<Mutex<IndexWriter>>,
}

impl NameIndex {
    /// Open (or create) a writable index for the given locale set and
    /// clear any previous documents, so a re-run starts from scratch.
    pub fn create(dir: &Path, locales: &[Locale]) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let mut schema_builder = Schema::builder();

        let ngram_indexing = TextFieldIndexing::default()
            .set_tokenizer(NGRAM_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let ngram_opts = TextOptions::default().set_indexing_options(ngram_indexing);
        let ngram_field = schema_builder.add_text_field("ngram", ngram_opts);

        let name_field = schema_builder.add_text_field("name", TextOptions::default().set_stored());
        let eid_field = schema_builder.add_text_field("eid", TextOptions::default().set_stored());

        let mut locale_fields = BTreeMap::new();
        for locale in locales {
            let field = schema_builder.add_bool_field(locale.as_str(), INDEXED | STORED);
            locale_fields.insert(locale.as_str().to_string(), field);
        }

        let schema = schema_builder.build();
        let directory = MmapDirectory::open(dir).map_err(index_error)?;
        let index = Index::open_or_create(directory, schema).map_err(index_error)?;
        register_tokenizer(&index)?;

        let mut writer: IndexWriter = index.writer(50_000_000).map_err(index_error)?;
        writer.delete_all_documents().map_err(index_error)?;

        Ok(Self {
            index,
            ngram_field,
            name_field,
            eid_field,
            locale_fields,
            writer: Some(Mutex::new(writer)),
        })
    }

    /// Open an existing index read-only, recovering the locale fields
    /// from the persisted schema.
    pub fn open(dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(dir).map_err(index_error)?;
        register_tokenizer(&index)?;
        let schema = index.schema();
        let ngram_field = schema.get_field("ngram").map_err(index_error)?;
        let name_field = schema.get_field("name").map_err(index_error)?;
        let eid_field = schema.get_field("eid").map_err(index_error)?;

        let mut locale_fields = BTreeMap::new();
        for (field, entry) in schema.fields() {
            if matches!(entry.field_type(), FieldType::Bool(_)) {
                locale_fields.insert(entry.name().to_string(), field);
            }
        }

        Ok(Self {
            index,
            ngram_field,
            name_field,
            eid_field,
            locale_fields,
            writer: None,
        })
    }

    /// Add one name document with its per-locale tag-presence flags.
    /// Flags for locales missing from `onehot` default to false.
    pub fn add_name(
        &self,
        name: &str,
        eid: &EntityId,
        onehot: &BTreeMap<Locale, bool>,
    ) -> Result<()> {
        let writer = self
            .writer
            .as_ref()
            .ok_or_else(|| Error::Index("index opened read-only".to_string()))?;

        let mut doc = TantivyDocument::new();
        doc.add_text(self.ngram_field, name);
        doc.add_text(self.name_field, name);
        doc.add_text(self.eid_field, eid.as_str());
        for (code, field) in &self.locale_fields {
            let flagged = onehot
                .iter()
                .any(|(locale, flag)| locale.as_str() == code && *flag);
            doc.add_bool(*field, flagged);
        }

        writer.lock().add_document(doc).map_err(index_error)?;
        Ok(())
    }

    /// Commit pending documents to disk.
    pub fn commit(&self) -> Result<()> {
        let writer = self
            .writer
            .as_ref()
            .ok_or_else(|| Error::Index("index opened read-only".to_string()))?;
        writer.lock().commit().map_err(index_error)?;
        tracing::info!("name index committed");
        Ok(())
    }

    /// Ngram substring search over entity names.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<NameHit>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let reader = self.index.reader().map_err(index_error)?;
        let searcher = reader.searcher();

        let mut parser = QueryParser::for_index(&self.index, vec![self.ngram_field]);
        parser.set_conjunction_by_default();
        let parsed = parser
            .parse_query(&query)
            .map_err(|e| Error::Index(format!("query parse failed: {e}")))?;

        let top_docs = searcher
            .search(&parsed, &TopDocs::with_limit(limit))
            .map_err(index_error)?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr).map_err(index_error)?;
            let name = doc
                .get_first(self.name_field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let eid = doc
                .get_first(self.eid_field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let locales = self
                .locale_fields
                .iter()
                .filter(|(_, field)| {
                    doc.get_first(**field).and_then(|v| v.as_bool()) == Some(true)
                })
                .map(|(code, _)| code.clone())
                .collect();
            hits.push(NameHit {
                name,
                eid,
                locales,
                score,
            });
        }
        Ok(hits)
    }

    /// Locale codes the index carries flags for.
    pub fn locales(&self) -> Vec<String> {
        self.locale_fields.keys().cloned().collect()
    }
}

fn register_tokenizer(index: &Index) -> Result<()> {
    let tokenizer = TextAnalyzer::builder(
        NgramTokenizer::new(3, 3, false).map_err(|e| Error::Index(e.to_string()))?,
    )
    .filter(LowerCaser)
    .build();
    index.tokenizers().register(NGRAM_TOKENIZER, tokenizer);
    Ok(())
}

fn index_error(e: impl std::fmt::Display) -> Error {
    Error::Index(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locales() -> Vec<Locale> {
        vec![Locale::new("en").unwrap(), Locale::new("ja").unwrap()]
    }

    fn onehot(en: bool, ja: bool) -> BTreeMap<Locale, bool> {
        BTreeMap::from([
            (Locale::new("en").unwrap(), en),
            (Locale::new("ja").unwrap(), ja),
        ])
    }

    fn populated_index(dir: &Path) -> NameIndex {
        let index = NameIndex::create(dir, &locales()).unwrap();
        let daft = EntityId::generate();
        let radiohead = EntityId::generate();
        index.add_name("Daft Punk", &daft, &onehot(true, true)).unwrap();
        index.add_name("Radiohead", &radiohead, &onehot(true, false)).unwrap();
        index.commit().unwrap();
        index
    }

    #[test]
    fn substring_search_matches_mid_name() {
        let dir = tempfile::tempdir().unwrap();
        let index = populated_index(dir.path());

        let hits = index.search("punk", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Daft Punk");
        assert_eq!(hits[0].locales, vec!["en", "ja"]);
    }

    #[test]
    fn locale_flags_are_stored_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let index = populated_index(dir.path());

        let hits = index.search("radio", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].locales, vec!["en"]);
    }

    #[test]
    fn empty_query_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let index = populated_index(dir.path());
        assert!(index.search("   ", 10).unwrap().is_empty());
    }

    #[test]
    fn reopen_reads_committed_documents() {
        let dir = tempfile::tempdir().unwrap();
        {
            populated_index(dir.path());
        }
        let reopened = NameIndex::open(dir.path()).unwrap();
        assert_eq!(reopened.locales(), vec!["en", "ja"]);
        let hits = reopened.search("daft", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Daft Punk");
    }

    #[test]
    fn create_clears_previous_documents() {
        let dir = tempfile::tempdir().unwrap();
        {
            populated_index(dir.path());
        }
        let index = NameIndex::create(dir.path(), &locales()).unwrap();
        let other = EntityId::generate();
        index.add_name("Justice", &other, &onehot(true, false)).unwrap();
        index.commit().unwrap();

        assert!(index.search("daft", 10).unwrap().is_empty());
        assert_eq!(index.search("justice", 10).unwrap().len(), 1);
    }
}
