//! Plain-text rendering of reports for terminal output.

use integrity_core::models::{IntegrityReport, SimilarityMatch};
use integrity_core::plagiarism::PlagiarismReport;
use std::fmt::Write;

pub fn plagiarism(report: &PlagiarismReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "plagiarism score: {:.0}/95", report.score);
    if report.signals.is_empty() {
        out.push_str("  no signals\n");
    }
    for signal in &report.signals {
        let _ = writeln!(
            out,
            "  [{:>4.0}] {} (x{})",
            signal.weight, signal.description, signal.occurrences
        );
    }
    out
}

pub fn source_line(m: &SimilarityMatch) -> String {
    let authors = if m.authors.is_empty() {
        "unknown authors".to_string()
    } else {
        m.authors.join(", ")
    };
    format!(
        "{:>5.1}%  {}  \"{}\" by {}",
        m.similarity * 100.0,
        m.source_id,
        m.title,
        authors
    )
}

pub fn report(label: &str, report: &IntegrityReport) -> String {
    let a = &report.analysis;
    let mut out = String::new();
    let _ = writeln!(out, "== {} ({} words)", label, report.word_count);
    let _ = writeln!(
        out,
        "topic: {} | level: {} | confidence {:.2} ({})",
        a.topic,
        a.academic_level,
        a.confidence_score,
        report.analysis_source.as_str()
    );
    let _ = writeln!(out, "themes: {}", a.key_themes.join(", "));
    if let Some(q) = a.writing_quality {
        let _ = writeln!(out, "writing quality: {:?}", q);
    }
    let _ = writeln!(out, "research: {}", a.research_suggestions);
    let _ = writeln!(out, "citations: {}", a.citation_recommendations);
    if let Some(strengths) = &a.strengths {
        let _ = writeln!(out, "strengths: {}", strengths.join("; "));
    }
    if let Some(areas) = &a.improvement_areas {
        let _ = writeln!(out, "improve: {}", areas.join("; "));
    }
    out.push_str(&plagiarism(&report.plagiarism));
    if report.suggested_sources.is_empty() {
        out.push_str("no similar sources\n");
    } else {
        out.push_str("similar sources:\n");
        for m in &report.suggested_sources {
            let _ = writeln!(out, "  {}", source_line(m));
        }
    }
    if !report.skipped_sources.is_empty() {
        let _ = writeln!(
            out,
            "skipped malformed sources: {}",
            report.skipped_sources.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_line_formats_percentage() {
        let m = SimilarityMatch {
            source_id: "s1".to_string(),
            title: "Reefs".to_string(),
            authors: vec!["Kim".to_string(), "Lee".to_string()],
            abstract_text: String::new(),
            similarity: 0.875,
        };
        let line = source_line(&m);
        assert!(line.contains("87.5%"), "{}", line);
        assert!(line.contains("\"Reefs\" by Kim, Lee"));
    }

    #[test]
    fn empty_plagiarism_report() {
        let text = plagiarism(&PlagiarismReport::default());
        assert!(text.starts_with("plagiarism score: 0/95"));
        assert!(text.contains("no signals"));
    }
}
