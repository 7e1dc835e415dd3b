//! Process configuration with environment binding.
//!
//! Every path has a default derived from the data directory and can be
//! overridden by an environment variable; CLI flags override both.

use std::env;
use std::path::{Path, PathBuf};

/// Paths to corpora, artifacts and durable state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the corpus inputs.
    pub data_dir: PathBuf,
    /// Precomputed tag-embedding table (csv, row id = normalized tag).
    pub embeddings: PathBuf,
    /// Entity-name search index directory.
    pub index_dir: PathBuf,
    /// Key-value store snapshot file.
    pub store_path: PathBuf,
}

impl Config {
    /// Bind from the environment, falling back to defaults under `./data`.
    pub fn from_env() -> Self {
        let data_dir = env_path("GLOTMAP_DATA").unwrap_or_else(|| PathBuf::from("data"));
        Self {
            embeddings: env_path("GLOTMAP_EMBEDDINGS")
                .unwrap_or_else(|| data_dir.join("embeddings.csv")),
            index_dir: env_path("GLOTMAP_INDEX").unwrap_or_else(|| data_dir.join("index")),
            store_path: env_path("GLOTMAP_STORE").unwrap_or_else(|| data_dir.join("store.bin")),
            data_dir,
        }
    }

    /// Config rooted at an explicit data directory (no env lookups).
    pub fn rooted(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            embeddings: data_dir.join("embeddings.csv"),
            index_dir: data_dir.join("index"),
            store_path: data_dir.join("store.bin"),
            data_dir,
        }
    }

    pub fn tag_corpus(&self) -> PathBuf {
        self.data_dir.join("corpus.csv")
    }

    pub fn entity_corpus(&self) -> PathBuf {
        self.data_dir.join("entities.csv")
    }

    pub fn languages(&self) -> PathBuf {
        self.data_dir.join("languages.csv")
    }

    /// Completion marker: while this file exists, ingestion is a no-op.
    pub fn ingestion_marker(&self) -> PathBuf {
        self.data_dir.join("ingestion.lock")
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(|v| Path::new(&v).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_derives_all_paths_from_data_dir() {
        let config = Config::rooted("/opt/glotmap");
        assert_eq!(config.tag_corpus(), PathBuf::from("/opt/glotmap/corpus.csv"));
        assert_eq!(config.embeddings, PathBuf::from("/opt/glotmap/embeddings.csv"));
        assert_eq!(config.index_dir, PathBuf::from("/opt/glotmap/index"));
        assert_eq!(
            config.ingestion_marker(),
            PathBuf::from("/opt/glotmap/ingestion.lock")
        );
    }
}
