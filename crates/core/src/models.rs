use crate::plagiarism::PlagiarismReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference-corpus entry. The embedding is kept as stored so that a
/// malformed value can be detected and skipped at ranking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    /// Flat numeric array when well formed. Missing reads as null.
    #[serde(default)]
    pub embedding: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityMatch {
    pub source_id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub similarity: f32,
}

impl SimilarityMatch {
    pub fn new(source: &SourceRecord, similarity: f32) -> Self {
        Self {
            source_id: source.id.clone(),
            title: source.title.clone(),
            authors: source.authors.clone(),
            abstract_text: source.abstract_text.clone(),
            similarity,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AcademicLevel {
    #[serde(rename = "High School")]
    HighSchool,
    Undergraduate,
    #[serde(rename = "Master/Graduate")]
    MasterGraduate,
    #[serde(rename = "PhD")]
    PhD,
}

impl AcademicLevel {
    /// Lenient parse of what a model is likely to write.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_lowercase();
        if s.contains("high school") || s == "secondary" {
            Some(AcademicLevel::HighSchool)
        } else if s.contains("undergrad") || s.contains("bachelor") {
            Some(AcademicLevel::Undergraduate)
        } else if s.contains("phd") || s.contains("ph.d") || s.contains("doctor") {
            Some(AcademicLevel::PhD)
        } else if s.contains("master") || s.contains("graduate") {
            Some(AcademicLevel::MasterGraduate)
        } else {
            None
        }
    }
}

impl fmt::Display for AcademicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AcademicLevel::HighSchool => "High School",
            AcademicLevel::Undergraduate => "Undergraduate",
            AcademicLevel::MasterGraduate => "Master/Graduate",
            AcademicLevel::PhD => "PhD",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WritingQuality {
    Poor,
    Average,
    Good,
    Excellent,
}

impl WritingQuality {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "poor" => Some(WritingQuality::Poor),
            "average" | "fair" => Some(WritingQuality::Average),
            "good" => Some(WritingQuality::Good),
            "excellent" => Some(WritingQuality::Excellent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub topic: String,
    pub academic_level: AcademicLevel,
    pub key_themes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writing_quality: Option<WritingQuality>,
    pub research_suggestions: String,
    pub citation_recommendations: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_areas: Option<Vec<String>>,
    pub confidence_score: f32,
}

/// Where an [`AnalysisResult`] came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Model,
    Fallback,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Model => "model",
            AnalysisSource::Fallback => "fallback",
        }
    }
}

/// Everything produced for one submitted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub document_hash: String,
    pub word_count: usize,
    pub analysis: AnalysisResult,
    pub analysis_source: AnalysisSource,
    pub plagiarism: PlagiarismReport,
    pub suggested_sources: Vec<SimilarityMatch>,
    pub skipped_sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn academic_level_parse() {
        assert_eq!(AcademicLevel::parse("PhD"), Some(AcademicLevel::PhD));
        assert_eq!(AcademicLevel::parse("Doctoral"), Some(AcademicLevel::PhD));
        assert_eq!(
            AcademicLevel::parse("Master/Graduate"),
            Some(AcademicLevel::MasterGraduate)
        );
        assert_eq!(
            AcademicLevel::parse("undergraduate"),
            Some(AcademicLevel::Undergraduate)
        );
        assert_eq!(
            AcademicLevel::parse("High School"),
            Some(AcademicLevel::HighSchool)
        );
        assert_eq!(AcademicLevel::parse("kindergarten"), None);
    }

    #[test]
    fn academic_level_serializes_as_display_name() {
        let json = serde_json::to_string(&AcademicLevel::MasterGraduate).unwrap();
        assert_eq!(json, "\"Master/Graduate\"");
        assert_eq!(AcademicLevel::HighSchool.to_string(), "High School");
    }

    #[test]
    fn source_record_reads_abstract_key() {
        let rec: SourceRecord = serde_json::from_str(
            r#"{"id":"a","title":"T","authors":["X"],"abstract":"Y","embedding":[0.1,0.2]}"#,
        )
        .unwrap();
        assert_eq!(rec.abstract_text, "Y");
        assert!(rec.embedding.is_array());
    }
}
