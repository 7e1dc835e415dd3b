//! Glotmap mapping engine
//!
//! Loads the precomputed tag-embedding table once per process, derives an
//! all-pairs cosine-similarity matrix from it, and answers ranked
//! cross-lingual tag predictions through cached per-locale-pair mapper
//! handles.

pub mod cache;
pub mod embeddings;
pub mod mapper;
pub mod similarity;

pub use embeddings::EmbeddingTable;
pub use mapper::{GenreMapper, MapperRegistry, PartialPrediction, TagProvider};
pub use similarity::{SimilarityCell, SimilarityMatrix};
