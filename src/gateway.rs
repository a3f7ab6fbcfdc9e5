//! Fail-closed wrapper around the classification capability.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::assembler::FeatureVector;
use crate::classifier::{Classifier, DecisionForest};
use crate::codec::{self, FertilizerPrediction};
use crate::error::ClassifierError;

// ---

/// Converts feature vectors into fertilizer labels.
///
/// A gateway built without a classifier stays unavailable for the life of
/// the process and never attempts a call.
#[derive(Clone)]
pub struct ClassificationGateway {
    classifier: Option<Arc<dyn Classifier>>,
}

impl ClassificationGateway {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    pub fn unavailable() -> Self {
        Self { classifier: None }
    }

    /// Load the artifact at `path`; on failure log it and start unavailable.
    pub fn load(path: &Path) -> Self {
        // ---
        match DecisionForest::load(path) {
            Ok(forest) => {
                info!(
                    path = %path.display(),
                    trees = forest.tree_count(),
                    "Classifier loaded successfully"
                );
                Self::new(Arc::new(forest))
            }
            Err(e) => {
                error!("Error loading classifier: {:#}", e);
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.classifier.is_some()
    }

    /// Run the classifier and decode its output.
    ///
    /// Classifier errors and panics are both reported as
    /// [`ClassifierError::InvocationFailed`]; an out-of-range code is a
    /// successful [`FertilizerPrediction::Unknown`].
    pub fn classify(
        &self,
        features: &FeatureVector,
    ) -> Result<FertilizerPrediction, ClassifierError> {
        // ---
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(ClassifierError::Unavailable)?;

        debug!(features = ?features.as_slice(), "Classifier input");

        let code = panic::catch_unwind(AssertUnwindSafe(|| classifier.predict(features)))
            .map_err(|payload| {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "classifier panicked".to_string());
                ClassifierError::InvocationFailed(detail)
            })?
            .map_err(|e| ClassifierError::InvocationFailed(format!("{e:#}")))?;

        let prediction = codec::decode_fertilizer(code);
        info!(code, label = prediction.label(), "Classifier prediction");
        Ok(prediction)
    }
}

impl std::fmt::Debug for ClassificationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationGateway")
            .field("available", &self.is_available())
            .finish()
    }
}
