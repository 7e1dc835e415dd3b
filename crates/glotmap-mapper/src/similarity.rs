//! All-pairs cosine similarity over the embedding table.
//!
//! The single most expensive computation in the subsystem (O(n²·d));
//! built exactly once per process behind [`SimilarityCell`] and read-only
//! afterwards.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::info;

use glotmap_core::Result;

use crate::embeddings::EmbeddingTable;

/// Symmetric cosine-similarity matrix indexed by normalized tag on both
/// axes. Values in [-1, 1], diagonal ~= 1.
#[derive(Debug)]
pub struct SimilarityMatrix {
    tags: Vec<String>,
    positions: HashMap<String, usize>,
    /// Row-major n*n scores.
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Unit-normalize every embedding row, then fill the matrix with
    /// pairwise dot products (which are then cosines).
    pub fn from_embeddings(table: &EmbeddingTable) -> Self {
        let n = table.len();
        let mut unit: Vec<Vec<f32>> = table.vectors().to_vec();
        for row in &mut unit {
            normalize_in_place(row);
        }

        let mut values = vec![0.0f32; n * n];
        for i in 0..n {
            for j in i..n {
                let score = dot(&unit[i], &unit[j]);
                values[i * n + j] = score;
                values[j * n + i] = score;
            }
        }

        let positions = table
            .tags()
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.clone(), i))
            .collect();

        Self {
            tags: table.tags().to_vec(),
            positions,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Position of a normalized tag on both axes, if embedded.
    pub fn position(&self, tag: &str) -> Option<usize> {
        self.positions.get(tag).copied()
    }

    /// Score at known positions.
    pub fn at(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.tags.len() + j]
    }

    /// Score for two normalized tags, `None` when either is unembedded.
    pub fn score(&self, a: &str, b: &str) -> Option<f32> {
        Some(self.at(self.position(a)?, self.position(b)?))
    }
}

fn normalize_in_place(v: &mut [f32]) {
    let norm2: f32 = v.iter().map(|x| x * x).sum();
    if norm2 <= 0.0 {
        return;
    }
    let inv = 1.0 / norm2.sqrt();
    for x in v.iter_mut() {
        *x *= inv;
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

// ============================================================================
// Process-wide cell
// ============================================================================

/// Lazily built, process-wide similarity matrix.
///
/// First use pays the build; the lock is held for the whole load so
/// concurrent first callers serialize instead of duplicating the O(n²·d)
/// computation or observing a torn table.
#[derive(Default)]
pub struct SimilarityCell {
    slot: Mutex<Option<Arc<SimilarityMatrix>>>,
}

impl SimilarityCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared matrix, building it from the artifact at `path`
    /// on first use. A failed load leaves the cell empty so a later call
    /// can retry.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<SimilarityMatrix>> {
        let mut slot = self.slot.lock();
        if let Some(matrix) = slot.as_ref() {
            return Ok(Arc::clone(matrix));
        }
        let started = Instant::now();
        let table = EmbeddingTable::load(path)?;
        let matrix = Arc::new(SimilarityMatrix::from_embeddings(&table));
        info!(
            tags = matrix.len(),
            dim = table.dim(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "similarity matrix built"
        );
        *slot = Some(Arc::clone(&matrix));
        Ok(matrix)
    }

    /// Whether the matrix has been built yet.
    pub fn is_loaded(&self) -> bool {
        self.slot.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use approx::assert_relative_eq;

    use super::*;

    fn table_from(rows: &str) -> EmbeddingTable {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        drop(file);
        EmbeddingTable::load(&path).unwrap()
    }

    #[test]
    fn diagonal_is_one_within_tolerance() {
        let table = table_from("en:rock,1.0,2.0,3.0\nen:pop,0.5,0.5,0.5\n");
        let matrix = SimilarityMatrix::from_embeddings(&table);
        for i in 0..matrix.len() {
            assert_relative_eq!(matrix.at(i, i), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn matrix_is_symmetric() {
        let table = table_from("a:a,1.0,0.0\nb:b,0.3,0.7\nc:c,-0.2,0.9\n");
        let matrix = SimilarityMatrix::from_embeddings(&table);
        for i in 0..matrix.len() {
            for j in 0..matrix.len() {
                assert_relative_eq!(matrix.at(i, j), matrix.at(j, i));
            }
        }
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let table = table_from("a:a,1.0,0.0\nb:b,0.0,1.0\n");
        let matrix = SimilarityMatrix::from_embeddings(&table);
        assert_relative_eq!(matrix.score("a:a", "b:b").unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn identical_vectors_score_one() {
        let table = table_from("en:rock,0.4,0.2,0.1\nja:ロック,0.4,0.2,0.1\n");
        let matrix = SimilarityMatrix::from_embeddings(&table);
        assert_relative_eq!(
            matrix.score("en:rock", "ja:ロック").unwrap(),
            1.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn unembedded_tag_has_no_score() {
        let table = table_from("a:a,1.0\n");
        let matrix = SimilarityMatrix::from_embeddings(&table);
        assert!(matrix.score("a:a", "z:z").is_none());
        assert!(matrix.position("z:z").is_none());
    }

    #[test]
    fn cell_builds_once_and_shares() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.csv");
        std::fs::write(&path, "a:a,1.0,0.0\nb:b,0.0,1.0\n").unwrap();

        let cell = SimilarityCell::new();
        assert!(!cell.is_loaded());
        let first = cell.get_or_load(&path).unwrap();
        let second = cell.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn cell_surfaces_missing_artifact() {
        let cell = SimilarityCell::new();
        assert!(cell
            .get_or_load(Path::new("/nonexistent/embeddings.csv"))
            .is_err());
        assert!(!cell.is_loaded());
    }
}
