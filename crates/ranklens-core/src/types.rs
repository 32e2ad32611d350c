//! Common types shared by the scoring components

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signals derived from one fetched page.
///
/// Created once per analysis request and never mutated. `raw_html` is the
/// single source of truth: every other field here can be re-derived from it,
/// and the scoring components pattern-match against it directly in addition
/// to the structured fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSignals {
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub language_tag: Option<String>,
    /// H1 heading text in document order, duplicates allowed
    pub h1_headings: Vec<String>,
    /// H2 heading text in document order, duplicates allowed
    pub h2_headings: Vec<String>,
    /// Raw text of each JSON-LD block. May be malformed JSON; the scorers
    /// match substrings of the text and never parse it.
    pub structured_data_blocks: Vec<String>,
    pub word_count: usize,
    pub load_time_ms: u64,
    pub status_code: u16,
    pub page_size_kb: usize,
    pub raw_html: String,
}

/// One scored rubric line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFactor {
    /// Stable identifier from the rubric's closed factor enumeration.
    /// Downstream formatting and persisted history key on it.
    pub name: String,
    pub points_awarded: u32,
    /// Embeds the measured value that drove the tier decision
    /// (character count, word count, ...).
    pub explanation: String,
}

impl ScoreFactor {
    pub fn new(name: &str, points_awarded: u32, explanation: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            points_awarded,
            explanation: explanation.into(),
        }
    }
}

/// Output of one scoring component. Immutable once returned; serialized for
/// reporting and for the recommendation call, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// 0-100, rounded from `raw_points / raw_points_max`
    pub normalized_score: u8,
    pub raw_points: u32,
    /// Constant per rubric (130 traditional, 150 AI-readiness)
    pub raw_points_max: u32,
    /// Factors in the rubric's canonical display order
    pub factors: Vec<ScoreFactor>,
    /// Named boolean signals computed during scoring. A `BTreeMap` keeps the
    /// serialized key order stable across runs.
    pub derived_flags: BTreeMap<String, bool>,
}

impl Evaluation {
    /// Sum of awarded points across all factors. Equal to `raw_points` by
    /// construction; exposed for consumers that re-verify breakdowns.
    pub fn factor_point_sum(&self) -> u32 {
        self.factors.iter().map(|f| f.points_awarded).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_factor_creation() {
        let factor = ScoreFactor::new("title_tag", 15, "title is 55 characters");

        assert_eq!(factor.name, "title_tag");
        assert_eq!(factor.points_awarded, 15);
        assert_eq!(factor.explanation, "title is 55 characters");
    }

    #[test]
    fn test_evaluation_factor_point_sum() {
        let evaluation = Evaluation {
            normalized_score: 17,
            raw_points: 22,
            raw_points_max: 130,
            factors: vec![
                ScoreFactor::new("title_tag", 15, "title is 55 characters"),
                ScoreFactor::new("canonical_tag", 7, "canonical URL present"),
            ],
            derived_flags: BTreeMap::new(),
        };

        assert_eq!(evaluation.factor_point_sum(), 22);
    }

    #[test]
    fn test_derived_flags_serialize_in_key_order() {
        let mut flags = BTreeMap::new();
        flags.insert("has_title".to_string(), true);
        flags.insert("has_canonical".to_string(), false);

        let evaluation = Evaluation {
            normalized_score: 0,
            raw_points: 0,
            raw_points_max: 130,
            factors: vec![],
            derived_flags: flags,
        };

        let json = serde_json::to_string(&evaluation).unwrap();
        let canonical_pos = json.find("has_canonical").unwrap();
        let title_pos = json.find("has_title").unwrap();
        assert!(canonical_pos < title_pos);
    }
}
