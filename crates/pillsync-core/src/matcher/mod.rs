//! Text matching between patient photos and registered medicines.
//!
//! Pipeline: Normalization → Scoring → Best-match selection

mod normalizer;
mod scorer;
mod selector;
pub mod sequence;

pub use normalizer::*;
pub use scorer::*;
pub use selector::*;

use thiserror::Error;

/// Matcher errors.
#[derive(Error, Debug, PartialEq)]
pub enum MatchError {
    #[error("No candidates to select from")]
    EmptyCandidateSet,
}

pub type MatchOutcome<T> = Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "\\PC{0,60}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn scores_stay_in_unit_range(
            text in "[a-zA-Z0-9 ]{0,40}",
            name in "[a-zA-Z0-9 ]{0,20}",
        ) {
            let result = compare(&text, &name, None);
            prop_assert!((0.0..=1.0).contains(&result.confidence));
            prop_assert!((0.0..=1.0).contains(&result.similarity));
            prop_assert!((0.0..=1.0).contains(&result.word_match_ratio));
        }

        #[test]
        fn comparison_ignores_case(
            text in "[a-zA-Z0-9 ]{1,40}",
            name in "[a-zA-Z0-9 ]{1,20}",
            ocr in "[a-zA-Z0-9 ]{1,40}",
        ) {
            let lower = compare(&text.to_lowercase(), &name.to_lowercase(), Some(&ocr.to_lowercase()));
            let upper = compare(&text.to_uppercase(), &name.to_uppercase(), Some(&ocr.to_uppercase()));
            let mixed = compare(&text, &name.to_uppercase(), Some(&ocr));

            for other in [&upper, &mixed] {
                prop_assert_eq!(lower.direct_match, other.direct_match);
                prop_assert_eq!(lower.similarity, other.similarity);
                prop_assert_eq!(lower.ocr_match, other.ocr_match);
                prop_assert_eq!(lower.word_match_ratio, other.word_match_ratio);
                prop_assert_eq!(lower.confidence, other.confidence);
                prop_assert_eq!(lower.is_match, other.is_match);
                prop_assert_eq!(&lower.common_words, &other.common_words);
            }
        }

        #[test]
        fn match_follows_unrounded_confidence(
            text in "[a-zA-Z0-9 ]{0,40}",
            name in "[a-zA-Z0-9 ]{0,20}",
            ocr in proptest::option::of("[a-zA-Z0-9 ]{0,40}"),
            threshold in 0.0f64..=1.0,
        ) {
            let scorer = Scorer::new(crate::config::MatchConfig::default().with_match_threshold(threshold));
            let result = scorer.compare(&text, &name, ocr.as_deref());
            prop_assert_eq!(result.is_match, result.confidence >= threshold);
        }

        #[test]
        fn embedded_name_is_direct_match(
            prefix in "[a-z ]{0,20}",
            name in "[a-z]{1,12}",
            suffix in "[a-z ]{0,20}",
        ) {
            let text = format!("{}{}{}", prefix, name, suffix);
            let result = compare(&text, &name, None);
            prop_assert!(result.direct_match);
            prop_assert_eq!(result.confidence, 0.95);
            prop_assert!(result.is_match);
        }

        #[test]
        fn raising_threshold_never_adds_matches(
            text in "[a-z ]{0,40}",
            name in "[a-z ]{1,20}",
            low in 0.0f64..=1.0,
            high in 0.0f64..=1.0,
        ) {
            let (low, high) = if low <= high { (low, high) } else { (high, low) };
            let lenient = Scorer::new(crate::config::MatchConfig::default().with_match_threshold(low));
            let strict = Scorer::new(crate::config::MatchConfig::default().with_match_threshold(high));
            if strict.compare(&text, &name, None).is_match {
                prop_assert!(lenient.compare(&text, &name, None).is_match);
            }
        }

        #[test]
        fn comparison_is_deterministic(
            text in "[a-zA-Z0-9 ]{0,40}",
            name in "[a-zA-Z0-9 ]{0,20}",
        ) {
            prop_assert_eq!(compare(&text, &name, None), compare(&text, &name, None));
        }
    }
}
