//! Learned classifier adapter.
//!
//! The pipeline consumes the learned model through `LearnedClassifier`,
//! which has one operation. `NullClassifier` stands in when no exemplar
//! archive is available, so the arbiter never branches on model presence.

use std::cmp::Ordering;

use signvote_models::{ClassificationResult, Gesture};

use crate::config::MAX_NEIGHBORS;
use crate::error::{EngineError, EngineResult};
use crate::normalize::{FeatureVector, FEATURE_DIM};

/// A fitted predictor over normalized (x, y) landmark features.
pub trait LearnedClassifier: Send + Sync {
    /// Predict a label and its estimated probability.
    ///
    /// Returns `None` when no model is loaded.
    fn predict(&self, features: &FeatureVector) -> Option<ClassificationResult>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Stand-in used when no model could be loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClassifier;

impl LearnedClassifier for NullClassifier {
    fn predict(&self, _features: &FeatureVector) -> Option<ClassificationResult> {
        None
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// One labeled exemplar.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: FeatureVector,
    pub label: Gesture,
}

impl Sample {
    pub fn new(features: FeatureVector, label: Gesture) -> Self {
        Self { features, label }
    }

    /// Build a sample from an untrusted row.
    pub fn from_row(row: &[f32], label: Gesture) -> EngineResult<Self> {
        let features: FeatureVector =
            row.try_into()
                .map_err(|_| EngineError::FeatureDimension {
                    expected: FEATURE_DIM,
                    found: row.len(),
                })?;
        Ok(Self::new(features, label))
    }
}

/// Uniform-weight k-nearest-neighbor classifier with Euclidean distance.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    features: Vec<FeatureVector>,
    /// Index into `classes` per exemplar.
    targets: Vec<usize>,
    /// Distinct labels ordered by their wire text.
    classes: Vec<Gesture>,
    k: usize,
}

impl KnnClassifier {
    /// Fit over the given exemplars with the default neighbor cap.
    pub fn fit(samples: Vec<Sample>) -> EngineResult<Self> {
        Self::fit_with_max_neighbors(samples, MAX_NEIGHBORS)
    }

    /// Fit with `k = min(max_neighbors, max(1, n / 2))`.
    pub fn fit_with_max_neighbors(
        samples: Vec<Sample>,
        max_neighbors: usize,
    ) -> EngineResult<Self> {
        if samples.is_empty() {
            return Err(EngineError::EmptyDataset);
        }

        let mut classes: Vec<Gesture> = Vec::new();
        for sample in &samples {
            if !classes.contains(&sample.label) {
                classes.push(sample.label);
            }
        }
        classes.sort_by_key(|g| g.as_str());

        let k = max_neighbors.min((samples.len() / 2).max(1)).max(1);

        let mut features = Vec::with_capacity(samples.len());
        let mut targets = Vec::with_capacity(samples.len());
        for sample in samples {
            let class = classes
                .iter()
                .position(|c| *c == sample.label)
                .unwrap_or_default();
            features.push(sample.features);
            targets.push(class);
        }

        Ok(Self {
            features,
            targets,
            classes,
            k,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn classes(&self) -> &[Gesture] {
        &self.classes
    }

    pub fn sample_count(&self) -> usize {
        self.features.len()
    }

    /// Fraction of the `k` nearest exemplars voting for each class, aligned
    /// with `classes()`.
    pub fn predict_proba(&self, query: &FeatureVector) -> Vec<f64> {
        let mut distances: Vec<(f32, usize)> = self
            .features
            .iter()
            .enumerate()
            .map(|(i, f)| (squared_distance(f, query), i))
            .collect();
        // Equal distances keep archive order.
        distances.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let mut votes = vec![0usize; self.classes.len()];
        for (_, i) in distances.iter().take(self.k) {
            votes[self.targets[*i]] += 1;
        }

        votes
            .into_iter()
            .map(|v| v as f64 / self.k as f64)
            .collect()
    }
}

impl LearnedClassifier for KnnClassifier {
    fn predict(&self, features: &FeatureVector) -> Option<ClassificationResult> {
        let proba = self.predict_proba(features);

        // First maximum wins, matching class order.
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }

        Some(ClassificationResult::learned(self.classes[best], proba[best]))
    }

    fn name(&self) -> &'static str {
        "knn"
    }
}

fn squared_distance(a: &FeatureVector, b: &FeatureVector) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use signvote_models::ClassifierSource;

    fn features(value: f32) -> FeatureVector {
        [value; FEATURE_DIM]
    }

    fn samples(rows: &[(f32, Gesture)]) -> Vec<Sample> {
        rows.iter().map(|(v, g)| Sample::new(features(*v), *g)).collect()
    }

    #[test]
    fn test_null_classifier_predicts_nothing() {
        assert_eq!(NullClassifier.predict(&features(0.0)), None);
        assert_eq!(NullClassifier.name(), "none");
    }

    #[test]
    fn test_k_selection() {
        let one = KnnClassifier::fit(samples(&[(0.0, Gesture::Yes)])).unwrap();
        assert_eq!(one.k(), 1);

        let four = KnnClassifier::fit(samples(&[
            (0.0, Gesture::Yes),
            (0.1, Gesture::Yes),
            (1.0, Gesture::No),
            (1.1, Gesture::No),
        ]))
        .unwrap();
        assert_eq!(four.k(), 2);

        let many: Vec<(f32, Gesture)> = (0..40).map(|i| (i as f32, Gesture::No)).collect();
        assert_eq!(KnnClassifier::fit(samples(&many)).unwrap().k(), 5);
    }

    #[test]
    fn test_empty_fit_is_rejected() {
        assert!(matches!(
            KnnClassifier::fit(Vec::new()),
            Err(EngineError::EmptyDataset)
        ));
    }

    #[test]
    fn test_classes_sorted_by_label_text() {
        let knn = KnnClassifier::fit(samples(&[
            (0.0, Gesture::Yes),
            (1.0, Gesture::Unknown),
            (2.0, Gesture::No),
        ]))
        .unwrap();
        assert_eq!(knn.classes(), &[Gesture::No, Gesture::Unknown, Gesture::Yes]);
    }

    #[test]
    fn test_majority_vote_probability() {
        // n = 10 -> k = 5
        let knn = KnnClassifier::fit(samples(&[
            (0.00, Gesture::Yes),
            (0.01, Gesture::Yes),
            (0.02, Gesture::Yes),
            (0.03, Gesture::No),
            (0.04, Gesture::No),
            (5.00, Gesture::No),
            (5.01, Gesture::No),
            (5.02, Gesture::No),
            (5.03, Gesture::No),
            (5.04, Gesture::No),
        ]))
        .unwrap();

        let result = knn.predict(&features(0.0)).unwrap();
        assert_eq!(result.label, Gesture::Yes);
        assert!((result.confidence - 0.6).abs() < 1e-9);
        assert_eq!(result.source, ClassifierSource::Learned);

        let proba = knn.predict_proba(&features(5.0));
        assert_eq!(proba, vec![1.0, 0.0]);
    }

    #[test]
    fn test_tie_resolves_to_first_class() {
        // n = 4 -> k = 2, one vote each.
        let knn = KnnClassifier::fit(samples(&[
            (0.0, Gesture::Yes),
            (0.0, Gesture::No),
            (9.0, Gesture::Yes),
            (9.0, Gesture::No),
        ]))
        .unwrap();
        let result = knn.predict(&features(0.0)).unwrap();
        assert_eq!(result.label, Gesture::No);
        assert!((result.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sample_from_row_checks_dimension() {
        assert!(Sample::from_row(&[0.0; 42], Gesture::Yes).is_ok());
        assert!(matches!(
            Sample::from_row(&[0.0; 63], Gesture::Yes),
            Err(EngineError::FeatureDimension { expected: 42, found: 63 })
        ));
    }
}
