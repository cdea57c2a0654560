//! Heuristic plagiarism scoring.
//!
//! Looks for artifacts that survive copy-and-paste from published sources:
//! publisher boilerplate, citation residue, raw links, stitched sentence
//! rhythms, boilerplate phrasing and unwrapped lines. The score is a pure
//! function of the text, capped below certainty.

use crate::document::{significant_words, split_sentences};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_SIGNIFICANT_WORDS: usize = 50;
pub const MAX_SCORE: f32 = 95.0;

const URL_WEIGHT: f32 = 15.0;
const VARIANCE_MIN_SENTENCES: usize = 5;
const VARIANCE_MIN_SENTENCE_CHARS: usize = 20;
const VARIANCE_THRESHOLD: f64 = 500.0;
const VARIANCE_WEIGHT: f32 = 15.0;
const PHRASE_OVERUSE_THRESHOLD: usize = 8;
const PHRASE_WEIGHT_CAP: f32 = 20.0;
const LONG_LINE_CHARS: usize = 120;
const LONG_LINE_THRESHOLD: usize = 5;
const LONG_LINE_WEIGHT: f32 = 10.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SignalCategory {
    DefiniteIndicator,
    CitationArtifact,
    Url,
    SentenceVariance,
    PhraseOveruse,
    FormattingAnomaly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlagiarismSignal {
    pub category: SignalCategory,
    pub indicator: String,
    pub occurrences: usize,
    pub weight: f32,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlagiarismReport {
    pub score: f32,
    pub signals: Vec<PlagiarismSignal>,
}

impl PlagiarismReport {
    /// Human-readable descriptions, in detection order.
    pub fn flagged_sections(&self) -> Vec<String> {
        self.signals.iter().map(|s| s.description.clone()).collect()
    }

    pub fn has(&self, indicator: &str) -> bool {
        self.signals.iter().any(|s| s.indicator == indicator)
    }
}

struct Pattern {
    name: &'static str,
    regex: Regex,
    weight: f32,
    label: &'static str,
}

fn pattern(name: &'static str, re: &str, weight: f32, label: &'static str) -> Pattern {
    Pattern {
        name,
        regex: Regex::new(re).unwrap_or_else(|e| panic!("bad {} pattern: {}", name, e)),
        weight,
        label,
    }
}

/// Scored once per type, however often they appear.
static DEFINITE: Lazy<Vec<Pattern>> = Lazy::new(|| {
    vec![
        pattern(
            "copyright-notice",
            r"(?:copyright\s*(?:©|\(c\))?|©)\s*\d{4}",
            40.0,
            "Copyright notice",
        ),
        pattern(
            "all-rights-reserved",
            r"all rights reserved",
            35.0,
            "\"All rights reserved\" statement",
        ),
        pattern(
            "publication-statement",
            r"\bpublished (?:in|by)\b",
            25.0,
            "Publication statement",
        ),
        pattern(
            "journal-reference",
            r"\bvol(?:ume)?\.?\s*\d+\s*(?:,\s*|\()\s*(?:no\.?|issue)?\s*\d+|\bjournal of [a-z]+[^.\n]*\d+\s*\(\d+\)",
            30.0,
            "Journal volume/issue reference",
        ),
        pattern(
            "doi",
            r"\bdoi:\s*10\.\d{4,9}/\S+|\b10\.\d{4,9}/[-._;()/:a-z0-9]+",
            35.0,
            "DOI identifier",
        ),
        pattern(
            "retrieved-from",
            r"retrieved from\s+(?:https?://|www\.)\S+",
            30.0,
            "\"Retrieved from\" link",
        ),
        pattern(
            "isbn",
            r"\bisbn(?:-1[03])?:?\s*[0-9][0-9-]{8,16}[0-9x]",
            30.0,
            "ISBN",
        ),
    ]
});

/// Scored per occurrence.
static CITATIONS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    vec![
        pattern(
            "author-year-citation",
            r"\([a-z][a-z'-]+(?: et al\.?| (?:and|&) [a-z][a-z'-]+)?,?\s+\d{4}[a-z]?\)",
            3.0,
            "Parenthetical author-year citation",
        ),
        pattern(
            "bracket-citation",
            r"\[\d+(?:\s*[,–-]\s*\d+)*\]",
            2.0,
            "Numbered bracket citation",
        ),
        pattern("et-al", r"\bet al\.", 2.0, "\"et al.\" reference"),
        pattern("page-reference", r"\bpp\.\s*\d+", 3.0, "Page reference"),
        pattern(
            "according-to",
            r"\baccording to (?:dr\.? |professor )?[a-z]+(?:'s)?\b",
            2.0,
            "\"According to\" attribution",
        ),
        pattern("as-cited-in", r"\bas cited in\b", 5.0, "\"As cited in\" attribution"),
        pattern("cf-reference", r"\bcf\.\s+\w+", 2.0, "\"cf.\" cross-reference"),
    ]
});

/// Lower-case words that follow "according to" in ordinary prose.
const NON_NAME_WORDS: &[&str] = &[
    "the", "a", "an", "this", "these", "those", "that", "our", "their", "his", "her", "its",
    "some", "many", "most", "recent", "current", "data", "results", "findings", "research",
    "studies", "plan", "schedule",
];

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"')\]]+|\bwww\.[a-z0-9-]+\.[a-z]{2,}[^\s<>"')\]]*"#)
        .unwrap_or_else(|e| panic!("bad url pattern: {}", e))
});

const ACADEMIC_PHRASES: &[&str] = &[
    "in conclusion",
    "the results indicate that",
    "previous research has shown",
    "it is important to note",
    "in recent years",
    "plays a crucial role",
    "a growing body of",
    "it can be concluded that",
    "further research is needed",
    "the purpose of this study",
    "the findings suggest that",
    "on the other hand",
    "in addition to",
    "it has been argued that",
    "there is evidence that",
    "the aim of this paper",
    "in the context of",
    "with respect to",
    "as a result",
    "taken together",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PlagiarismScorer;

impl PlagiarismScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, text: &str) -> PlagiarismReport {
        if significant_words(text) < MIN_SIGNIFICANT_WORDS {
            return PlagiarismReport::default();
        }

        let lowered = text.to_lowercase();
        let mut signals = Vec::new();

        definite_indicators(&lowered, &mut signals);
        citation_artifacts(&lowered, &mut signals);
        raw_urls(&lowered, &mut signals);
        sentence_variance(&lowered, &mut signals);
        phrase_overuse(&lowered, &mut signals);
        long_lines(&lowered, &mut signals);

        let total: f32 = signals.iter().map(|s| s.weight).sum();
        PlagiarismReport {
            score: total.min(MAX_SCORE),
            signals,
        }
    }
}

pub fn score(text: &str) -> PlagiarismReport {
    PlagiarismScorer::new().score(text)
}

fn definite_indicators(text: &str, out: &mut Vec<PlagiarismSignal>) {
    for p in DEFINITE.iter() {
        let occurrences = p.regex.find_iter(text).count();
        if occurrences == 0 {
            continue;
        }
        out.push(PlagiarismSignal {
            category: SignalCategory::DefiniteIndicator,
            indicator: p.name.to_string(),
            occurrences,
            weight: p.weight,
            description: format!("{} detected", p.label),
        });
    }
}

fn citation_artifacts(text: &str, out: &mut Vec<PlagiarismSignal>) {
    for p in CITATIONS.iter() {
        let occurrences = p
            .regex
            .find_iter(text)
            .filter(|m| p.name != "according-to" || names_a_person(m.as_str()))
            .count();
        if occurrences == 0 {
            continue;
        }
        out.push(PlagiarismSignal {
            category: SignalCategory::CitationArtifact,
            indicator: p.name.to_string(),
            occurrences,
            weight: p.weight * occurrences as f32,
            description: format!("{} found {} time(s)", p.label, occurrences),
        });
    }
}

fn names_a_person(matched: &str) -> bool {
    matched
        .split_whitespace()
        .last()
        .map(|w| w.trim_end_matches("'s"))
        .map(|w| !NON_NAME_WORDS.contains(&w))
        .unwrap_or(false)
}

fn raw_urls(text: &str, out: &mut Vec<PlagiarismSignal>) {
    let occurrences = URL.find_iter(text).count();
    if occurrences == 0 {
        return;
    }
    out.push(PlagiarismSignal {
        category: SignalCategory::Url,
        indicator: "raw-url".to_string(),
        occurrences,
        weight: URL_WEIGHT * occurrences as f32,
        description: format!("{} raw URL(s) in body text", occurrences),
    });
}

fn sentence_variance(text: &str, out: &mut Vec<PlagiarismSignal>) {
    let lengths: Vec<f64> = split_sentences(text)
        .filter(|s| s.chars().count() > VARIANCE_MIN_SENTENCE_CHARS)
        .map(|s| s.split_whitespace().count() as f64)
        .collect();
    if lengths.len() < VARIANCE_MIN_SENTENCES {
        return;
    }
    let variance = population_variance(&lengths);
    if variance > VARIANCE_THRESHOLD {
        out.push(PlagiarismSignal {
            category: SignalCategory::SentenceVariance,
            indicator: "sentence-length-variance".to_string(),
            occurrences: lengths.len(),
            weight: VARIANCE_WEIGHT,
            description: format!(
                "Irregular sentence lengths (variance {:.1}) suggest stitched sources",
                variance
            ),
        });
    }
}

fn population_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

fn phrase_overuse(text: &str, out: &mut Vec<PlagiarismSignal>) {
    let count: usize = ACADEMIC_PHRASES
        .iter()
        .map(|phrase| text.matches(phrase).count())
        .sum();
    if count > PHRASE_OVERUSE_THRESHOLD {
        out.push(PlagiarismSignal {
            category: SignalCategory::PhraseOveruse,
            indicator: "academic-phrase-overuse".to_string(),
            occurrences: count,
            weight: (count as f32 * 2.0).min(PHRASE_WEIGHT_CAP),
            description: format!("{} stock academic phrases", count),
        });
    }
}

fn long_lines(text: &str, out: &mut Vec<PlagiarismSignal>) {
    let count = text
        .lines()
        .map(str::trim)
        .filter(|l| l.chars().count() > LONG_LINE_CHARS && l.chars().any(char::is_alphabetic))
        .count();
    if count > LONG_LINE_THRESHOLD {
        out.push(PlagiarismSignal {
            category: SignalCategory::FormattingAnomaly,
            indicator: "unwrapped-lines".to_string(),
            occurrences: count,
            weight: LONG_LINE_WEIGHT,
            description: format!("{} unwrapped lines over {} characters", count, LONG_LINE_CHARS),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLER: &[&str] = &[
        "wetland", "sediment", "nitrogen", "estuary", "salinity", "vegetation", "hydrology",
        "sampling",
    ];

    /// `n` significant words, no punctuation, one line.
    fn filler(n: usize) -> String {
        (0..n)
            .map(|i| FILLER[i % FILLER.len()])
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_document_scores_zero() {
        let text = format!("Copyright © 2020 all rights reserved {}", filler(34));
        assert_eq!(text.split_whitespace().count(), 40);
        let report = score(&text);
        assert_eq!(report.score, 0.0);
        assert!(report.signals.is_empty());
    }

    #[test]
    fn copyright_and_rights_reserved() {
        let text = format!(
            "{} Copyright © 2020 Coastal Press. All rights reserved",
            filler(60)
        );
        let report = score(&text);
        assert!(report.score >= 75.0, "score {}", report.score);
        assert!(report.has("copyright-notice"));
        assert!(report.has("all-rights-reserved"));
        assert_eq!(report.signals.len(), 2);
    }

    #[test]
    fn definite_indicator_counts_once() {
        let once = format!("{} copyright 2019", filler(60));
        let twice = format!("{} copyright 2019 and again copyright 2021", filler(60));
        let a = score(&once);
        let b = score(&twice);
        assert_eq!(a.score, 40.0);
        assert_eq!(b.score, 40.0);
        assert_eq!(b.signals[0].occurrences, 2);
    }

    #[test]
    fn each_definite_indicator_is_recognised() {
        let cases = [
            ("published by elsevier", "publication-statement", 25.0),
            ("vol. 12, no. 3", "journal-reference", 30.0),
            ("doi: 10.1016/j.ecss.2019.01.002", "doi", 35.0),
            ("ISBN 978-3-16-148410-0", "isbn", 30.0),
        ];
        for (snippet, indicator, weight) in cases {
            let report = score(&format!("{} {}", filler(60), snippet));
            assert!(report.has(indicator), "{} not detected", indicator);
            let signal = report
                .signals
                .iter()
                .find(|s| s.indicator == indicator)
                .unwrap();
            assert_eq!(signal.weight, weight);
        }
    }

    #[test]
    fn retrieved_from_also_counts_the_url() {
        let report = score(&format!(
            "{} retrieved from https://example.org/paper",
            filler(60)
        ));
        assert!(report.has("retrieved-from"));
        assert!(report.has("raw-url"));
        assert_eq!(report.score, 45.0);
    }

    #[test]
    fn citation_weights_multiply() {
        let text = format!("{} smith et al. jones et al. brown et al.", filler(60));
        let report = score(&text);
        let signal = report.signals.iter().find(|s| s.indicator == "et-al").unwrap();
        assert_eq!(signal.occurrences, 3);
        assert_eq!(signal.weight, 6.0);
    }

    #[test]
    fn author_year_and_bracket_citations() {
        let text = format!(
            "{} (Smith, 2019) and (Jones and Lee 2020) per [3] and [4, 5]",
            filler(60)
        );
        let report = score(&text);
        let ay = report
            .signals
            .iter()
            .find(|s| s.indicator == "author-year-citation")
            .unwrap();
        assert_eq!(ay.occurrences, 2);
        let br = report
            .signals
            .iter()
            .find(|s| s.indicator == "bracket-citation")
            .unwrap();
        assert_eq!(br.occurrences, 2);
        assert_eq!(report.score, 10.0);
    }

    #[test]
    fn according_to_ignores_ordinary_prose() {
        let prose = score(&format!("{} according to the survey", filler(60)));
        assert!(!prose.has("according-to"));
        let named = score(&format!("{} according to Hartmann", filler(60)));
        assert!(named.has("according-to"));
    }

    #[test]
    fn urls_score_per_occurrence() {
        let text = format!(
            "{} see https://a.example.com/x and www.b-example.org/y",
            filler(60)
        );
        let report = score(&text);
        assert_eq!(report.score, 30.0);
    }

    #[test]
    fn score_is_capped() {
        let urls = (0..10)
            .map(|i| format!("https://site{}.example.com", i))
            .collect::<Vec<_>>()
            .join(" ");
        let report = score(&format!("{} {}", filler(60), urls));
        assert_eq!(report.score, MAX_SCORE);
    }

    #[test]
    fn irregular_sentence_lengths() {
        let short = "wetland sediment nitrogen estuary salinity";
        let text = format!(
            "{s}. {s}. {s}. {s}. {long}.",
            s = short,
            long = filler(80)
        );
        let report = score(&text);
        assert!(report.has("sentence-length-variance"));
        assert_eq!(report.score, 15.0);
    }

    #[test]
    fn even_sentence_lengths_do_not_trigger() {
        let s = "wetland sediment nitrogen estuary salinity vegetation";
        let text = (0..12).map(|_| s).collect::<Vec<_>>().join(". ");
        let report = score(&text);
        assert!(!report.has("sentence-length-variance"));
    }

    #[test]
    fn phrase_overuse_contribution() {
        let phrases = (0..9).map(|_| "in conclusion").collect::<Vec<_>>().join(" ");
        let report = score(&format!("{} {}", filler(60), phrases));
        assert_eq!(report.score, 18.0);

        let phrases = (0..8).map(|_| "in conclusion").collect::<Vec<_>>().join(" ");
        let report = score(&format!("{} {}", filler(60), phrases));
        assert!(!report.has("academic-phrase-overuse"));

        let phrases = (0..15).map(|_| "taken together").collect::<Vec<_>>().join(" ");
        let report = score(&format!("{} {}", filler(60), phrases));
        assert_eq!(report.score, 20.0);
    }

    #[test]
    fn unwrapped_lines() {
        let line = filler(20);
        assert!(line.chars().count() > 120);
        let six = (0..6).map(|_| line.clone()).collect::<Vec<_>>().join("\n");
        assert_eq!(score(&six).score, 10.0);
        let five = (0..5).map(|_| line.clone()).collect::<Vec<_>>().join("\n");
        assert_eq!(score(&five).score, 0.0);
    }

    #[test]
    fn monotonic_as_indicators_are_added() {
        let additions = [
            "copyright 2020",
            "all rights reserved",
            "smith et al.",
            "https://example.com/source",
            "as cited in",
            "published in",
            "doi: 10.1000/xyz123",
        ];
        let mut text = filler(60);
        let mut last = score(&text).score;
        for add in additions {
            text.push(' ');
            text.push_str(add);
            let current = score(&text).score;
            assert!(current >= last, "{} dropped score {} -> {}", add, last, current);
            assert!((0.0..=MAX_SCORE).contains(&current));
            last = current;
        }
        assert_eq!(last, MAX_SCORE);
    }

    #[test]
    fn reproducible() {
        let text = format!(
            "{} Copyright 2001. See https://x.org (Smith, 2001)",
            filler(70)
        );
        assert_eq!(score(&text), score(&text));
        assert_eq!(score(&text).flagged_sections().len(), 3);
    }
}
