//! Match result models produced by the scorer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};

/// Decimal places kept when scores are reported.
pub const REPORT_DECIMALS: i32 = 3;

/// Round a score for reporting; exact halves go to the even neighbour.
pub fn round_score(value: f64) -> f64 {
    let factor = 10f64.powi(REPORT_DECIMALS);
    (value * factor).round_ties_even() / factor
}

fn serialize_rounded<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_score(*value))
}

/// Outcome of comparing one patient photo text with one registered medicine.
///
/// Scores are kept unrounded; serialized forms round them to three decimals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// Whether the confidence reached the match threshold
    #[serde(rename = "match")]
    pub is_match: bool,
    /// Overall confidence (0.0 - 1.0)
    #[serde(serialize_with = "serialize_rounded")]
    pub confidence: f64,
    /// Registered name appears verbatim (case-insensitive) in the patient text
    pub direct_match: bool,
    /// Sequence similarity between patient text and registered name
    #[serde(serialize_with = "serialize_rounded")]
    pub similarity: f64,
    /// Share of registered-name words found in the patient text
    #[serde(serialize_with = "serialize_rounded")]
    pub word_match_ratio: f64,
    /// Patient text resembles the registration-time OCR text
    pub ocr_match: bool,
    /// Lower-cased words shared by both texts
    pub common_words: BTreeSet<String>,
    /// Registered name, original case
    pub registered_name: String,
    /// Leading characters of the original patient text
    pub patient_text_excerpt: String,
}

impl MatchResult {
    /// Confidence as reported to users.
    pub fn reported_confidence(&self) -> f64 {
        round_score(self.confidence)
    }
}

/// A match result tied to the registered medicine it was computed against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMatch {
    pub medicine_id: String,
    pub medicine_name: String,
    pub result: MatchResult,
}

impl CandidateMatch {
    pub fn confidence(&self) -> f64 {
        self.result.confidence
    }

    pub fn is_match(&self) -> bool {
        self.result.is_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchResult {
        MatchResult {
            is_match: true,
            confidence: 0.712_345,
            direct_match: false,
            similarity: 0.712_345,
            word_match_ratio: 0.333_333_3,
            ocr_match: false,
            common_words: ["500mg".to_string()].into_iter().collect(),
            registered_name: "Paracetamol 500mg".into(),
            patient_text_excerpt: "paracetamo 500mg".into(),
        }
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.95), 0.95);
        assert_eq!(round_score(0.712_345), 0.712);
        assert_eq!(round_score(0.9996), 1.0);
        assert_eq!(round_score(0.0), 0.0);
    }

    #[test]
    fn test_round_score_halves_to_even() {
        assert_eq!(round_score(0.8125), 0.812);
        assert_eq!(round_score(0.3125), 0.312);
        assert_eq!(round_score(0.0625), 0.062);
        assert_eq!(round_score(0.4375), 0.438);
    }

    #[test]
    fn test_serialized_fields_and_rounding() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["match"], true);
        assert_eq!(json["confidence"], 0.712);
        assert_eq!(json["similarity"], 0.712);
        assert_eq!(json["word_match_ratio"], 0.333);
        assert_eq!(json["direct_match"], false);
        assert_eq!(json["ocr_match"], false);
        assert_eq!(json["common_words"], serde_json::json!(["500mg"]));
        assert_eq!(json["registered_name"], "Paracetamol 500mg");
        assert_eq!(json["patient_text_excerpt"], "paracetamo 500mg");
    }

    #[test]
    fn test_reported_confidence() {
        assert_eq!(sample().reported_confidence(), 0.712);
    }
}
