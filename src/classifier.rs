//! Fertilizer classifier capability and its on-disk artifact.
//!
//! The service only depends on the [`Classifier`] trait. The shipped
//! implementation, [`DecisionForest`], evaluates a pre-trained tree ensemble
//! exported to JSON:
//!
//! ```json
//! {
//!   "feature_names": ["temperature", "humidity", "...6 more"],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 7, "threshold": 20.5, "left": 1, "right": 2 },
//!         { "class": 6 },
//!         { "class": 5 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node 0 is the root. A sample goes left when `x[feature] <= threshold`.
//! The prediction is the majority vote over all trees, ties going to the
//! smallest class code.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::assembler::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

// ---

/// A pre-trained decision function from a feature vector to a class code.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<i64>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    trees: Vec<Tree>,
}

impl Tree {
    fn validate(&self, index: usize) -> Result<()> {
        // ---
        if self.nodes.is_empty() {
            bail!("tree {index} has no nodes");
        }
        for (at, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                threshold,
                left,
                right,
            } = *node
            {
                if feature >= FEATURE_COUNT {
                    bail!("tree {index} node {at}: feature {feature} out of range");
                }
                if !threshold.is_finite() {
                    bail!("tree {index} node {at}: threshold is not finite");
                }
                // Children must come after their parent, which rules out
                // cycles and bounds every walk by the node count.
                for child in [left, right] {
                    if child <= at || child >= self.nodes.len() {
                        bail!("tree {index} node {at}: invalid child {child}");
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, x: &FeatureVector) -> Result<i64> {
        // ---
        let mut at = 0;
        loop {
            match self.nodes.get(at) {
                Some(Node::Leaf { class }) => return Ok(*class),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x
                        .get(*feature)
                        .ok_or_else(|| anyhow!("feature index {feature} out of range"))?;
                    if value.is_nan() {
                        bail!("feature {feature} is NaN");
                    }
                    at = if value <= *threshold { *left } else { *right };
                }
                None => bail!("node index {at} out of range"),
            }
        }
    }
}

/// Positions whose declared name differs from the service's input order,
/// ignoring case and surrounding whitespace.
fn mismatched_features(names: &[String]) -> Vec<usize> {
    names
        .iter()
        .zip(FEATURE_NAMES)
        .enumerate()
        .filter(|(_, (declared, expected))| !declared.trim().eq_ignore_ascii_case(expected))
        .map(|(at, _)| at)
        .collect()
}

/// Tree ensemble loaded from a JSON artifact.
#[derive(Debug, Clone)]
pub struct DecisionForest {
    trees: Vec<Tree>,
}

impl DecisionForest {
    /// Read and validate an artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        // ---
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read classifier artifact '{}'", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid classifier artifact '{}'", path.display()))
    }

    /// Parse and validate an artifact from its JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        // ---
        let artifact: Artifact =
            serde_json::from_str(raw).context("Failed to parse classifier JSON")?;

        if let Some(names) = &artifact.feature_names {
            if names.len() != FEATURE_COUNT {
                bail!(
                    "artifact declares {} features, expected {}",
                    names.len(),
                    FEATURE_COUNT
                );
            }
            let renamed = mismatched_features(names);
            if !renamed.is_empty() {
                // Exporters label columns their own way; only the order is
                // binding, so differing names are reported, not rejected.
                warn!(?renamed, expected = ?FEATURE_NAMES, "Artifact feature names differ");
            }
        }
        if artifact.trees.is_empty() {
            bail!("artifact contains no trees");
        }
        for (index, tree) in artifact.trees.iter().enumerate() {
            tree.validate(index)?;
        }

        debug!(trees = artifact.trees.len(), "Classifier artifact validated");
        Ok(Self {
            trees: artifact.trees,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for DecisionForest {
    fn predict(&self, features: &FeatureVector) -> Result<i64> {
        // ---
        let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.evaluate(features)?).or_default() += 1;
        }

        // BTreeMap iterates in ascending code order; keeping the first
        // maximum resolves ties to the smallest code.
        let mut best: Option<(i64, usize)> = None;
        for (class, count) in votes {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((class, count));
            }
        }
        best.map(|(class, _)| class)
            .ok_or_else(|| anyhow!("classifier produced no votes"))
    }
}
