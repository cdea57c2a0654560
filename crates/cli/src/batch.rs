//! Analyzing a set of files where one bad file never stops the rest.

use crate::inputs;
use integrity_core::models::{IntegrityReport, SourceRecord};
use integrity_core::AnalysisPipeline;
use std::path::PathBuf;
use tracing::warn;

pub struct FileOutcome {
    pub path: PathBuf,
    pub result: anyhow::Result<IntegrityReport>,
}

impl FileOutcome {
    pub fn label(&self) -> String {
        self.path.display().to_string()
    }

    pub fn to_json(&self) -> serde_json::Value {
        match &self.result {
            Ok(report) => serde_json::json!({ "path": self.label(), "report": report }),
            Err(err) => serde_json::json!({ "path": self.label(), "error": format!("{:#}", err) }),
        }
    }
}

/// Read and analyze each file in order. Read and analysis errors are logged
/// and kept in the outcome.
pub async fn analyze_files(
    pipeline: &AnalysisPipeline,
    files: &[PathBuf],
    sources: &[SourceRecord],
) -> Vec<FileOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let result = match inputs::read_document(file) {
            Ok(text) => pipeline.analyze(&text, sources).await.map_err(anyhow::Error::from),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            warn!("{}: {:#}", file.display(), err);
        }
        outcomes.push(FileOutcome {
            path: file.clone(),
            result,
        });
    }
    outcomes
}
