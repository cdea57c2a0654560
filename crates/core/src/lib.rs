//! Core library: embeddings, similarity ranking, heuristic plagiarism scoring
//! and report synthesis for submitted academic documents.

pub mod config;
pub mod corpus;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod history;
pub mod models;
pub mod pipeline;
pub mod plagiarism;
pub mod ranker;
pub mod similarity;
pub mod synthesis;

pub use error::AnalysisError;
pub use models::{AnalysisResult, IntegrityReport, SimilarityMatch, SourceRecord};
pub use pipeline::{build_registry, AnalysisPipeline};
