//! Precomputed tag-embedding table.
//!
//! External artifact, one csv row per normalized tag: column 0 is the tag
//! identifier, the remaining columns are the embedding coordinates. The
//! table is only ever read; training it is someone else's job.

use std::path::Path;

use glotmap_core::{Error, Result};

/// Dense embedding rows keyed by normalized tag.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    tags: Vec<String>,
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

impl EmbeddingTable {
    /// Load the artifact. Fails with [`Error::EmbeddingsNotFound`] when
    /// the file is absent; malformed rows are corpus errors.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::EmbeddingsNotFound(path.to_path_buf()));
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_path(path)
            .map_err(|e| Error::Corpus(format!("{}: {e}", path.display())))?;

        let mut tags = Vec::new();
        let mut vectors: Vec<Vec<f32>> = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::Corpus(format!("{}: {e}", path.display())))?;
            let mut fields = record.iter();
            let tag = fields
                .next()
                .ok_or_else(|| Error::Corpus(format!("{}: empty row {line}", path.display())))?;
            let vector: Vec<f32> = fields
                .map(|f| {
                    f.trim().parse::<f32>().map_err(|e| {
                        Error::Corpus(format!("{}: row {line}: bad coordinate {f:?}: {e}", path.display()))
                    })
                })
                .collect::<Result<_>>()?;
            if vector.is_empty() {
                return Err(Error::Corpus(format!(
                    "{}: row {line}: no coordinates for {tag:?}",
                    path.display()
                )));
            }
            tags.push(tag.to_string());
            vectors.push(vector);
        }

        let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
        if vectors.iter().any(|v| v.len() != dim) {
            return Err(Error::Corpus(format!(
                "{}: inconsistent embedding dimensions",
                path.display()
            )));
        }

        Ok(Self { tags, vectors, dim })
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_rows_and_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "en:rock,1.0,0.0,0.5").unwrap();
        writeln!(file, "ja:ロック,0.9,0.1,0.4").unwrap();
        drop(file);

        let table = EmbeddingTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.dim(), 3);
        assert_eq!(table.tags()[1], "ja:ロック");
    }

    #[test]
    fn missing_artifact_is_a_distinct_error() {
        let err = EmbeddingTable::load(Path::new("/nonexistent/embeddings.csv")).unwrap_err();
        assert!(matches!(err, Error::EmbeddingsNotFound(_)));
    }

    #[test]
    fn inconsistent_dimensions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.csv");
        std::fs::write(&path, "en:rock,1.0,0.0\nen:pop,1.0\n").unwrap();
        assert!(EmbeddingTable::load(&path).is_err());
    }

    #[test]
    fn bad_coordinates_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.csv");
        std::fs::write(&path, "en:rock,abc\n").unwrap();
        assert!(EmbeddingTable::load(&path).is_err());
    }
}
