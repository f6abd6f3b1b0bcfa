//! The four criterion scorers. Each returns a value in `[0, 1]`.

use std::collections::HashSet;

use crate::model::clamp_unit;
use crate::text::{sentences, tokenize, word_count, SENTENCE_TERMINATORS};

/// Coverage multiplier applied before capping completeness at 1.0.
const COMPLETENESS_BOOST: f64 = 1.5;

/// Content accuracy is the similarity score floored at 0 and capped at 1.
pub fn content_accuracy(similarity: f64) -> f64 {
    clamp_unit(similarity)
}

/// Fraction of unique reference tokens the student used, times 1.5, capped
/// at 1.0. A reference without tokens is vacuously complete.
pub fn completeness(student: &str, reference: &str) -> f64 {
    let reference_tokens: HashSet<String> = tokenize(reference).into_iter().collect();
    if reference_tokens.is_empty() {
        return 1.0;
    }
    let student_tokens: HashSet<String> = tokenize(student).into_iter().collect();
    let covered = reference_tokens.intersection(&student_tokens).count();
    let coverage = covered as f64 / reference_tokens.len() as f64;
    (coverage * COMPLETENESS_BOOST).min(1.0)
}

/// Banded score on mean sentence length in words.
///
/// | mean words | score |
/// |------------|-------|
/// | 10..=25    | 1.0   |
/// | < 5        | 0.4   |
/// | > 40       | 0.6   |
/// | otherwise  | 0.8   |
pub fn clarity(student: &str) -> f64 {
    let sentences = sentences(student);
    if sentences.is_empty() {
        return 0.0;
    }
    let total_words: usize = sentences.iter().map(|s| word_count(s)).sum();
    let mean = total_words as f64 / sentences.len() as f64;

    if (10.0..=25.0).contains(&mean) {
        1.0
    } else if mean < 5.0 {
        0.4
    } else if mean > 40.0 {
        0.6
    } else {
        0.8
    }
}

/// 0.4 for sentence-ending punctuation, 0.3 for any uppercase letter, 0.3
/// for at least ten words.
pub fn structure(student: &str) -> f64 {
    let mut score = 0.0;
    if student.contains(SENTENCE_TERMINATORS) {
        score += 0.4;
    }
    if student.chars().any(char::is_uppercase) {
        score += 0.3;
    }
    if word_count(student) >= 10 {
        score += 0.3;
    }
    clamp_unit(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_accuracy_floors_negative_similarity() {
        assert_eq!(content_accuracy(-0.25), 0.0);
        assert_eq!(content_accuracy(0.42), 0.42);
        assert_eq!(content_accuracy(1.0000001), 1.0);
    }

    #[test]
    fn completeness_vacuous_for_empty_reference() {
        assert_eq!(completeness("anything at all", ""), 1.0);
        assert_eq!(completeness("", "?!"), 1.0);
    }

    #[test]
    fn completeness_boost_and_cap() {
        // 2 of 4 unique reference tokens: 0.5 * 1.5 = 0.75
        let s = completeness("alpha beta", "alpha beta gamma delta");
        assert!((s - 0.75).abs() < 1e-12);
        // 4 of 5: 0.8 * 1.5 capped at 1.0
        assert_eq!(
            completeness(
                "The Earth revolves around the Sun.",
                "The Earth orbits around the Sun."
            ),
            1.0
        );
        assert_eq!(completeness("nothing shared", "alpha beta"), 0.0);
    }

    #[test]
    fn clarity_bands() {
        assert_eq!(clarity(""), 0.0);
        assert_eq!(clarity("..."), 0.0);
        assert_eq!(clarity("Too short."), 0.4);
        assert_eq!(clarity("The Earth revolves around the Sun."), 0.8);
        assert_eq!(
            clarity("Photosynthesis converts light energy into chemical energy inside plant cells."),
            1.0
        );
        let long = vec!["word"; 45].join(" ");
        assert_eq!(clarity(&long), 0.6);
    }

    #[test]
    fn clarity_uses_mean_across_sentences() {
        // 8 and 5 words -> mean 6.5
        let text = "This is a well-structured answer with proper punctuation. It covers the topic comprehensively.";
        assert_eq!(clarity(text), 0.8);
    }

    #[test]
    fn structure_exact_values() {
        assert_eq!(
            structure("Water boils at one hundred degrees Celsius at sea level pressure."),
            1.0
        );
        assert_eq!(structure("no punctuation or capitals here"), 0.0);
        assert!((structure("The Earth revolves around the Sun.") - 0.7).abs() < 1e-12);
        assert!((structure("lowercase but ends properly.") - 0.4).abs() < 1e-12);
    }

    #[test]
    fn all_scores_in_unit_interval() {
        let inputs = [
            "",
            "a",
            "A B C D E F G H I J K L.",
            "?!?!?!",
            "Ünïcode Tëxt with accents, and more words to pass ten in total!",
        ];
        for student in inputs {
            for reference in inputs {
                for s in [
                    completeness(student, reference),
                    clarity(student),
                    structure(student),
                ] {
                    assert!((0.0..=1.0).contains(&s), "{student:?} / {reference:?} -> {s}");
                }
            }
        }
    }
}
