//! Exemplar archive loading.
//!
//! The archive is a JSON document holding parallel arrays:
//!
//! ```json
//! { "X": [[0.0, 0.0, 0.41, -0.23, ...], ...], "y": ["YES", "OPEN_HAND", ...] }
//! ```
//!
//! Each row of `X` is the flattened (x, y) projection of 21 normalized
//! landmarks. Labels go through the same synonym table as every other label
//! in the system. Loading never writes to the archive.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use signvote_models::Gesture;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::learned::{KnnClassifier, LearnedClassifier, NullClassifier, Sample};

/// Default archive location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "./WLASL/wlasl_lite/sign_classifier_augmented.json";

#[derive(Debug, Deserialize)]
struct Archive {
    #[serde(rename = "X")]
    x: Vec<Vec<f32>>,
    #[serde(rename = "y")]
    y: Vec<String>,
}

/// Read labeled exemplars from an archive file.
///
/// Returns `Ok(None)` when the file does not exist. Rows whose label is not
/// part of the gesture vocabulary are skipped.
pub fn load_samples(path: &Path) -> EngineResult<Option<Vec<Sample>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)?;
    let archive: Archive = serde_json::from_str(&contents)
        .map_err(|e| EngineError::dataset(path, format!("invalid archive: {}", e)))?;

    if archive.x.len() != archive.y.len() {
        return Err(EngineError::dataset(
            path,
            format!(
                "{} feature rows but {} labels",
                archive.x.len(),
                archive.y.len()
            ),
        ));
    }

    let mut samples = Vec::with_capacity(archive.x.len());
    let mut skipped = 0usize;
    for (row, label) in archive.x.iter().zip(archive.y.iter()) {
        let gesture = match label.parse::<Gesture>() {
            Ok(g) => g,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        samples.push(Sample::from_row(row, gesture)?);
    }

    if skipped > 0 {
        warn!(
            path = %path.display(),
            skipped,
            "Skipped exemplars with labels outside the gesture vocabulary"
        );
    }

    Ok(Some(samples))
}

/// Load and fit the nearest-neighbor model.
///
/// Returns `Ok(None)` when the archive is missing or holds no usable samples.
pub fn load_model(path: &Path, max_neighbors: usize) -> EngineResult<Option<KnnClassifier>> {
    let samples = match load_samples(path)? {
        Some(samples) => samples,
        None => {
            warn!(path = %path.display(), "Model not found");
            return Ok(None);
        }
    };

    if samples.is_empty() {
        warn!(path = %path.display(), "Model dataset is empty");
        return Ok(None);
    }

    let model = KnnClassifier::fit_with_max_neighbors(samples, max_neighbors)?;
    info!(
        path = %path.display(),
        samples = model.sample_count(),
        k = model.k(),
        "Loaded ML model"
    );
    Ok(Some(model))
}

/// Load the learned classifier, substituting `NullClassifier` when no model
/// is available.
pub fn load_classifier(
    path: &Path,
    max_neighbors: usize,
) -> EngineResult<Arc<dyn LearnedClassifier>> {
    match load_model(path, max_neighbors)? {
        Some(model) => Ok(Arc::new(model)),
        None => {
            info!("ML model not available, using rule-based classification only");
            Ok(Arc::new(NullClassifier))
        }
    }
}
