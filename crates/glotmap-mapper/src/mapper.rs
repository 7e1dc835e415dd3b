//! The genre mapper.
//!
//! A [`GenreMapper`] is a rectangular slice of the similarity matrix:
//! rows are the raw tags of one or more source locales, columns the raw
//! tags of the target locale. Row and column labels stay in the
//! caller-visible raw-tag namespace; normalization happens only on the
//! way into the matrix. Handles are cached per (sorted sources, target)
//! in a bounded LRU and shared across callers.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use glotmap_core::{normalize, Error, Locale, Result};

use crate::cache::LruCache;
use crate::similarity::{SimilarityCell, SimilarityMatrix};

/// Supplies a locale's raw-tag vocabulary, typically backed by the
/// ingested tag sets.
pub trait TagProvider {
    fn tags(&self, locale: &Locale) -> Vec<String>;
}

impl<F> TagProvider for F
where
    F: Fn(&Locale) -> Vec<String>,
{
    fn tags(&self, locale: &Locale) -> Vec<String> {
        self(locale)
    }
}

/// Ranked predictions plus the input tags that had no row in the
/// sub-table, for callers that prefer dropping unknowns over failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialPrediction {
    pub predictions: Vec<String>,
    pub unknown: Vec<String>,
}

/// Source-tags × target-tags similarity sub-table.
#[derive(Debug)]
pub struct GenreMapper {
    sources: Vec<Locale>,
    target: Locale,
    /// Raw source tags (row labels), one entry per embedded vocabulary tag.
    rows: Vec<String>,
    /// Raw target tags (column labels), vocabulary order.
    cols: Vec<String>,
    row_positions: std::collections::HashMap<String, usize>,
    /// Row-major rows.len() * cols.len() scores.
    scores: Vec<f32>,
}

impl GenreMapper {
    fn build(
        matrix: &SimilarityMatrix,
        sources: &[Locale],
        target: &Locale,
        provider: &dyn TagProvider,
    ) -> Result<Self> {
        let mut source_tags = Vec::new();
        for locale in sources {
            source_tags.extend(provider.tags(locale));
        }
        let target_tags = provider.tags(target);

        let rows = embedded_positions(matrix, &source_tags)?;
        let cols = embedded_positions(matrix, &target_tags)?;

        let mut scores = Vec::with_capacity(rows.len() * cols.len());
        for (_, i) in &rows {
            for (_, j) in &cols {
                scores.push(matrix.at(*i, *j));
            }
        }

        let row_positions = rows
            .iter()
            .enumerate()
            .map(|(pos, (tag, _))| (tag.clone(), pos))
            .collect();

        debug!(
            sources = ?sources,
            %target,
            rows = rows.len(),
            cols = cols.len(),
            "mapper sub-table built"
        );

        Ok(Self {
            sources: sources.to_vec(),
            target: target.clone(),
            rows: rows.into_iter().map(|(tag, _)| tag).collect(),
            cols: cols.into_iter().map(|(tag, _)| tag).collect(),
            row_positions,
            scores,
        })
    }

    pub fn sources(&self) -> &[Locale] {
        &self.sources
    }

    pub fn target(&self) -> &Locale {
        &self.target
    }

    /// Raw source tags the sub-table can answer for.
    pub fn known_tags(&self) -> &[String] {
        &self.rows
    }

    /// Raw target vocabulary, in ranking tie-break order.
    pub fn target_vocabulary(&self) -> &[String] {
        &self.cols
    }

    /// Rank the target vocabulary for the given raw source tags.
    ///
    /// Strict: any tag without a row in the sub-table fails with
    /// [`Error::UnknownTag`] and leaves no state changed. Target tags are
    /// ordered by descending mean similarity across all given rows (mean,
    /// not max: a consistently close neighborhood beats a single strong
    /// correlation), ties broken by vocabulary order, then filtered.
    pub fn predict(
        &self,
        tags: &[String],
        filter: impl Fn(&str) -> bool,
    ) -> Result<Vec<String>> {
        let row_indices = tags
            .iter()
            .map(|tag| {
                self.row_positions
                    .get(tag.as_str())
                    .copied()
                    .ok_or_else(|| Error::UnknownTag(tag.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.rank(&row_indices, filter))
    }

    /// Like [`GenreMapper::predict`], but unknown tags are collected and
    /// reported instead of failing the whole call.
    pub fn predict_partial(
        &self,
        tags: &[String],
        filter: impl Fn(&str) -> bool,
    ) -> PartialPrediction {
        let mut row_indices = Vec::with_capacity(tags.len());
        let mut unknown = Vec::new();
        for tag in tags {
            match self.row_positions.get(tag.as_str()) {
                Some(pos) => row_indices.push(*pos),
                None => unknown.push(tag.clone()),
            }
        }
        PartialPrediction {
            predictions: self.rank(&row_indices, filter),
            unknown,
        }
    }

    fn rank(&self, row_indices: &[usize], filter: impl Fn(&str) -> bool) -> Vec<String> {
        if row_indices.is_empty() || self.cols.is_empty() {
            return Vec::new();
        }

        let mut means: Vec<(usize, f32)> = (0..self.cols.len())
            .map(|col| {
                let sum: f32 = row_indices
                    .iter()
                    .map(|row| self.scores[row * self.cols.len() + col])
                    .sum();
                (col, sum / row_indices.len() as f32)
            })
            .collect();

        // Descending mean; vocabulary order breaks ties so the ranking
        // is fully deterministic.
        means.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        means
            .into_iter()
            .map(|(col, _)| &self.cols[col])
            .filter(|tag| filter(tag))
            .cloned()
            .collect()
    }
}

/// Normalize raw tags and resolve their matrix positions, keeping the
/// raw tag as the caller-visible label. Vocabulary tags missing from the
/// embedding space are skipped with a warning: the vocabulary and the
/// embedding artifact are produced independently and one stale tag must
/// not take the whole locale pair down.
fn embedded_positions(
    matrix: &SimilarityMatrix,
    tags: &[String],
) -> Result<Vec<(String, usize)>> {
    let mut resolved = Vec::with_capacity(tags.len());
    for tag in tags {
        let normalized = normalize(tag)?;
        match matrix.position(normalized.as_str()) {
            Some(position) => resolved.push((tag.clone(), position)),
            None => warn!(tag, normalized = %normalized, "tag missing from embedding space"),
        }
    }
    Ok(resolved)
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MapperKey {
    sources: Vec<Locale>,
    target: Locale,
}

/// Cached factory for mapper handles.
///
/// Owns the process-wide similarity cell and a bounded LRU of handles
/// keyed by (sorted deduplicated sources, target). The registry lock is
/// held across a handle build, so concurrent first requests for the same
/// locale pair compute the slice once.
pub struct MapperRegistry {
    similarity: SimilarityCell,
    embeddings_path: PathBuf,
    handles: Mutex<LruCache<MapperKey, Arc<GenreMapper>>>,
}

impl MapperRegistry {
    pub fn new(embeddings_path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            similarity: SimilarityCell::new(),
            embeddings_path: embeddings_path.into(),
            handles: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Fetch or build the handle for `(sources, target)`.
    ///
    /// Fails with [`Error::InvalidArgument`] when `sources` is empty;
    /// locale shape is enforced by the [`Locale`] type itself.
    pub fn get(
        &self,
        sources: &[Locale],
        target: &Locale,
        provider: &dyn TagProvider,
    ) -> Result<Arc<GenreMapper>> {
        if sources.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one source locale is required".to_string(),
            ));
        }

        let mut sorted: Vec<Locale> = sources.to_vec();
        sorted.sort();
        sorted.dedup();
        let key = MapperKey {
            sources: sorted,
            target: target.clone(),
        };

        let mut handles = self.handles.lock();
        if let Some(handle) = handles.get(&key) {
            debug!(?key.sources, %key.target, "mapper cache hit");
            return Ok(handle);
        }

        let matrix = self.similarity.get_or_load(&self.embeddings_path)?;
        let handle = Arc::new(GenreMapper::build(
            &matrix,
            &key.sources,
            target,
            provider,
        )?);
        handles.put(key, Arc::clone(&handle));
        Ok(handle)
    }
}
