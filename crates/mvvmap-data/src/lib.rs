#![forbid(unsafe_code)]

//! Organization profile ingestion for `mvvmap`.
//!
//! Loads mission/vision/values rows from CSV, cleans them into profiles, summarizes the
//! dataset, and joins profiles with externally computed embeddings into layout entities.

pub mod dataset;
pub mod embeddings;
pub mod error;
pub mod profile;
pub mod text;

pub use dataset::{AnalysisData, CategoryCount, DatasetStats};
pub use embeddings::{EmbeddingIndex, text_features, to_entities};
pub use error::{Error, Result};
pub use profile::{
    CompanyProfile, CompanyRecord, ConfidenceScores, NumberedRecord, load_records, preprocess,
    read_records,
};
pub use text::{clean_text, combined_mvv};
