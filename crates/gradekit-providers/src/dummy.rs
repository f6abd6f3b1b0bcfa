//! Offline TF-IDF embedding provider.
//!
//! Produces deterministic vectors without any model download. Each `encode`
//! call builds its vocabulary from the texts in that batch, so vectors are
//! only comparable within one call. The grading service always embeds the
//! student and reference answer together, which makes a pair's similarity
//! depend on nothing but the two texts.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;

use gradekit_core::model::ProviderKind;
use gradekit_core::text::tokenize;
use gradekit_core::traits::{EmbeddingProvider, EmbeddingVector};
use gradekit_core::ProviderError;

/// TF-IDF stand-in for a sentence-embedding model.
pub struct DummyProvider {
    model: String,
}

impl DummyProvider {
    /// `model` is the name of the model this provider stands in for.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Synchronous core of [`EmbeddingProvider::encode`].
    pub fn vectorize(texts: &[String]) -> Vec<EmbeddingVector> {
        let documents: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

        // Sorted so that the same batch always yields the same axis order.
        let vocabulary: BTreeSet<&str> = documents
            .iter()
            .flat_map(|doc| doc.iter().map(String::as_str))
            .collect();

        let doc_sets: Vec<HashSet<&str>> = documents
            .iter()
            .map(|doc| doc.iter().map(String::as_str).collect())
            .collect();
        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let doc_count = doc_sets.iter().filter(|set| set.contains(term)).count();
                (n_docs / (doc_count as f64 + 1.0)).ln() + 1.0
            })
            .collect();

        documents
            .iter()
            .map(|doc| {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for token in doc {
                    *counts.entry(token.as_str()).or_default() += 1;
                }
                let len = doc.len() as f64;

                let mut vector: Vec<f64> = vocabulary
                    .iter()
                    .zip(&idf)
                    .map(|(term, idf)| {
                        let tf = if doc.is_empty() {
                            0.0
                        } else {
                            counts.get(term).copied().unwrap_or(0) as f64 / len
                        };
                        tf * idf
                    })
                    .collect();

                let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for x in &mut vector {
                        *x /= norm;
                    }
                }
                vector.into_iter().map(|x| x as f32).collect()
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for DummyProvider {
    fn name(&self) -> &str {
        "tfidf-dummy"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Dummy
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, ProviderError> {
        Ok(Self::vectorize(texts))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gradekit_core::model::{InitStrategy, ModelState};
    use gradekit_core::similarity::cosine_similarity;
    use gradekit_core::Grader;

    use super::*;

    fn batch(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn one_vector_per_text_with_shared_dimension() {
        let vectors = DummyProvider::vectorize(&batch(&["a b c", "c d", ""]));
        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.len() == 4));
    }

    #[test]
    fn vectors_are_unit_length_or_zero() {
        let vectors = DummyProvider::vectorize(&batch(&["The sky is blue.", "?!"]));
        let norm: f32 = vectors[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        assert!(vectors[1].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn identical_texts_have_full_similarity() {
        let vectors = DummyProvider::vectorize(&batch(&["The sky is blue", "The sky is blue"]));
        assert!((cosine_similarity(&vectors[0], &vectors[1]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn vocabulary_is_sorted_lexicographically() {
        // vocabulary: [apple, mango, zebra]; "zebra" only in the first text
        let vectors = DummyProvider::vectorize(&batch(&["zebra apple", "mango"]));
        assert!(vectors[0][0] > 0.0);
        assert_eq!(vectors[0][1], 0.0);
        assert!(vectors[0][2] > 0.0);
        assert_eq!(vectors[1], vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn idf_follows_smoothed_formula() {
        // N = 2. "shared" df = 2 -> ln(2/3) + 1; "solo" df = 1 -> ln(1) + 1 = 1.
        let vectors = DummyProvider::vectorize(&batch(&["shared solo", "shared"]));
        let shared_idf = (2.0f64 / 3.0).ln() + 1.0;
        let expected_ratio = shared_idf / 1.0;
        let ratio = f64::from(vectors[0][0]) / f64::from(vectors[0][1]);
        assert!((ratio - expected_ratio).abs() < 1e-5, "ratio {ratio}");
    }

    #[test]
    fn deterministic_across_runs() {
        let texts = batch(&[
            "The Earth revolves around the Sun.",
            "The Earth orbits around the Sun.",
        ]);
        let a = DummyProvider::vectorize(&texts);
        let b = DummyProvider::vectorize(&texts);
        assert_eq!(a, b);
        let similarity = cosine_similarity(&a[0], &a[1]);
        assert!((similarity - 0.7122).abs() < 1e-3, "similarity {similarity}");
    }

    #[tokio::test]
    async fn end_to_end_offline_grade() {
        let grader = Grader::new(
            Arc::new(DummyProvider::new("all-minilm")),
            ModelState {
                kind: ProviderKind::Dummy,
                model_name: "all-minilm".into(),
                strategy: InitStrategy::Dummy,
                fallback_used: true,
            },
        );
        let result = grader
            .grade_response(
                "The Earth revolves around the Sun.",
                "The Earth orbits around the Sun.",
            )
            .await;
        assert!(matches!(result.grade, 4 | 5), "grade {}", result.grade);

        let again = grader
            .grade_response(
                "The Earth revolves around the Sun.",
                "The Earth orbits around the Sun.",
            )
            .await;
        assert_eq!(result, again);
    }

    #[tokio::test]
    async fn batch_of_three_students() {
        let grader = Grader::new(
            Arc::new(DummyProvider::new("all-minilm")),
            ModelState {
                kind: ProviderKind::Dummy,
                model_name: "all-minilm".into(),
                strategy: InitStrategy::Dummy,
                fallback_used: true,
            },
        );
        let students = batch(&[
            "The Earth revolves around the Sun.",
            "Earth goes around the Sun in space.",
            "The Sun orbits the Earth.",
        ]);
        let results = grader
            .grade_multiple_responses(
                &students,
                "The Earth orbits around the Sun.",
                gradekit_core::GradingMode::Criteria,
            )
            .await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.grade <= 5 && r.scores.is_some()));
    }
}
