//! Multi-signal match scoring.
//!
//! Signals, all computed on lower-cased text:
//! - Direct match: registered name is a substring of the patient text
//! - Word overlap: share of registered-name words present in the patient text
//! - Similarity: sequence ratio between patient text and registered name
//! - OCR match: sequence ratio against the registration-time OCR text
//!
//! The first signal strong enough decides the confidence; signals are never blended.

use std::collections::BTreeSet;

use crate::config::MatchConfig;
use crate::models::{CandidateMatch, MatchResult, RegisteredMedicine};

use super::sequence;

/// Confidence when the registered name appears verbatim.
const DIRECT_MATCH_CONFIDENCE: f64 = 0.95;

/// Word overlap treated as a near-certain match, and its confidence.
const STRONG_WORD_RATIO: f64 = 0.8;
const STRONG_WORD_CONFIDENCE: f64 = 0.85;

/// Similarity reported as-is from this level up.
const STRONG_SIMILARITY: f64 = 0.7;

/// Confidence when only the registration OCR text matches.
const OCR_MATCH_CONFIDENCE: f64 = 0.75;

/// Partial word overlap and its weight.
const PARTIAL_WORD_RATIO: f64 = 0.5;
const PARTIAL_WORD_WEIGHT: f64 = 0.7;

/// Weight applied to similarity when nothing else fires.
const WEAK_SIMILARITY_WEIGHT: f64 = 0.5;

/// Scorer comparing patient photo text against registered medicines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    config: MatchConfig,
}

impl Scorer {
    /// Create a scorer with explicit thresholds.
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Compare patient photo text with a registered name and optional registration OCR.
    pub fn compare(
        &self,
        patient_text: &str,
        registered_name: &str,
        registered_ocr: Option<&str>,
    ) -> MatchResult {
        let patient_lower = patient_text.to_lowercase();
        let name_lower = registered_name.to_lowercase();

        let direct_match = patient_lower.contains(&name_lower);
        let similarity = sequence::ratio(&patient_lower, &name_lower);

        let ocr_match = match registered_ocr {
            Some(ocr) if !ocr.is_empty() => {
                sequence::ratio(&patient_lower, &ocr.to_lowercase()) > self.config.ocr_match_threshold
            }
            _ => false,
        };

        let registered_words: BTreeSet<&str> = name_lower.split_whitespace().collect();
        let patient_words: BTreeSet<&str> = patient_lower.split_whitespace().collect();
        let common_words: BTreeSet<String> = registered_words
            .intersection(&patient_words)
            .map(|w| w.to_string())
            .collect();
        let word_match_ratio = if registered_words.is_empty() {
            0.0
        } else {
            common_words.len() as f64 / registered_words.len() as f64
        };

        let confidence = cascade(direct_match, word_match_ratio, similarity, ocr_match);

        MatchResult {
            is_match: confidence >= self.config.match_threshold,
            confidence,
            direct_match,
            similarity,
            word_match_ratio,
            ocr_match,
            common_words,
            registered_name: registered_name.to_string(),
            patient_text_excerpt: patient_text.chars().take(self.config.excerpt_chars).collect(),
        }
    }

    /// Compare patient text with one registered medicine.
    pub fn compare_medicine(&self, patient_text: &str, medicine: &RegisteredMedicine) -> CandidateMatch {
        CandidateMatch {
            medicine_id: medicine.medicine_id.clone(),
            medicine_name: medicine.name.clone(),
            result: self.compare(patient_text, &medicine.name, medicine.registered_ocr()),
        }
    }

    /// Compare patient text with every medicine, preserving input order.
    pub fn compare_all(&self, patient_text: &str, medicines: &[RegisteredMedicine]) -> Vec<CandidateMatch> {
        medicines
            .iter()
            .map(|m| self.compare_medicine(patient_text, m))
            .collect()
    }
}

/// Priority cascade: the first branch that applies decides the confidence.
fn cascade(direct_match: bool, word_match_ratio: f64, similarity: f64, ocr_match: bool) -> f64 {
    if direct_match {
        DIRECT_MATCH_CONFIDENCE
    } else if word_match_ratio >= STRONG_WORD_RATIO {
        STRONG_WORD_CONFIDENCE
    } else if similarity >= STRONG_SIMILARITY {
        similarity
    } else if ocr_match {
        OCR_MATCH_CONFIDENCE
    } else if word_match_ratio >= PARTIAL_WORD_RATIO {
        word_match_ratio * PARTIAL_WORD_WEIGHT
    } else {
        similarity * WEAK_SIMILARITY_WEIGHT
    }
}

/// Compare with default thresholds.
pub fn compare(patient_text: &str, registered_name: &str, registered_ocr: Option<&str>) -> MatchResult {
    Scorer::default().compare(patient_text, registered_name, registered_ocr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_direct_match() {
        let result = compare("Take PARACETAMOL 500mg twice daily", "Paracetamol 500mg", Some(""));

        assert!(result.direct_match);
        assert_eq!(result.confidence, 0.95);
        assert!(result.is_match);
        assert_eq!(result.word_match_ratio, 1.0);
        assert_eq!(
            result.common_words.iter().cloned().collect::<Vec<_>>(),
            vec!["500mg".to_string(), "paracetamol".to_string()]
        );
        assert_eq!(result.registered_name, "Paracetamol 500mg");
        assert_eq!(result.patient_text_excerpt, "Take PARACETAMOL 500mg twice daily");
    }

    #[test]
    fn test_unrelated_text() {
        let result = compare("completely unrelated text here", "Ibuprofen", None);

        assert!(!result.direct_match);
        assert_eq!(result.word_match_ratio, 0.0);
        assert!(result.common_words.is_empty());
        assert!(approx(result.similarity, 2.0 / 13.0));
        assert!(approx(result.confidence, result.similarity * 0.5));
        assert!(!result.is_match);
    }

    #[test]
    fn test_direct_match_short_circuits_ocr() {
        let result = compare("Aspirin tablet", "Aspirin", Some("Aspirin 300mg tablet box"));

        assert!(result.direct_match);
        assert!(result.ocr_match);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_empty_patient_text() {
        let result = compare("", "Ibuprofen", None);

        assert!(!result.direct_match);
        assert_eq!(result.similarity, 0.0);
        assert_eq!(result.word_match_ratio, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.is_match);
        assert_eq!(result.patient_text_excerpt, "");
    }

    #[test]
    fn test_strong_word_overlap() {
        let result = compare(
            "Atorvastatin calcium tablets 20 mg store below 25C",
            "Atorvastatin Calcium 20 mg",
            None,
        );

        assert!(!result.direct_match);
        assert_eq!(result.word_match_ratio, 1.0);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_similarity_branch() {
        let result = compare("Paracetamo1", "Paracetamol", None);

        assert!(approx(result.similarity, 10.0 / 11.0));
        assert_eq!(result.confidence, result.similarity);
        assert!(result.is_match);
    }

    #[test]
    fn test_ocr_match_branch() {
        let result = compare(
            "Amoxicillin capsules 250mg box",
            "Amoxil 250",
            Some("Amoxicillin capsules 250mg box of 21"),
        );

        assert!(approx(result.similarity, 0.5));
        assert!(result.ocr_match);
        assert_eq!(result.confidence, 0.75);
        assert!(result.is_match);

        let unrelated_ocr = compare("Amoxicillin capsules 250mg box", "Amoxil 250", Some("Paracetamol caplets"));
        assert!(!unrelated_ocr.ocr_match);
        assert!(approx(unrelated_ocr.confidence, 0.25));
    }

    #[test]
    fn test_partial_word_branch() {
        let result = compare("box: vitamin d3 drops for infants", "Vitamin C", None);

        assert_eq!(result.word_match_ratio, 0.5);
        assert!(approx(result.confidence, 0.35));
        assert!(!result.is_match);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = Scorer::new(MatchConfig::default().with_match_threshold(0.8));
        let result = strict.compare("Amoxicilin 250mg", "Amoxicillin", None);

        assert!(approx(result.similarity, 20.0 / 27.0));
        assert!(!result.is_match);
        assert!(compare("Amoxicilin 250mg", "Amoxicillin", None).is_match);
    }

    #[test]
    fn test_excerpt_is_first_hundred_chars() {
        let long_text = format!("{}é", "a".repeat(120));
        let result = compare(&long_text, "Aspirin", None);

        assert_eq!(result.patient_text_excerpt.chars().count(), 100);
        assert!(result.patient_text_excerpt.chars().all(|c| c == 'a'));
    }

    #[test]
    fn test_compare_all_preserves_order() {
        let medicines = vec![
            RegisteredMedicine::new("u".into(), "Ibuprofen".into()),
            RegisteredMedicine::new("u".into(), "Aspirin".into()),
        ];
        let results = Scorer::default().compare_all("Aspirin 300mg", &medicines);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].medicine_name, "Ibuprofen");
        assert_eq!(results[1].medicine_name, "Aspirin");
        assert!(results[1].is_match());
    }

    #[test]
    fn test_half_tie_reported_to_even() {
        let result = compare("Amlodipne 5mg tabs", "Amlodipine 5mg", None);

        assert_eq!(result.confidence, 0.8125);
        assert_eq!(result.reported_confidence(), 0.812);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["confidence"], 0.812);
        assert_eq!(json["similarity"], 0.812);
    }

    #[test]
    fn test_whitespace_only_name_has_no_words() {
        let result = compare("anything", "   ", None);
        assert_eq!(result.word_match_ratio, 0.0);
    }
}
