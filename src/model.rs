use crate::features::FeatureRecord;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Models deeper than this fail validation at load time. Evaluation itself
/// stays unbounded so in-bounds models are scored exactly.
pub const MAX_TREE_DEPTH: usize = 64;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("node is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("tree {index} exceeds maximum depth {max}", max = MAX_TREE_DEPTH)]
    TooDeep { index: usize },

    #[error("tree {index} has leaf probability {prob} outside [0,1]")]
    BadProbability { index: usize, prob: f64 },
}

/// One node of an exported decision tree. Internal nodes exclusively own
/// both children, so a loaded tree is finite and acyclic by construction.
#[derive(Debug, Clone)]
pub enum TreeNode {
    Leaf {
        prob_phish: f64,
    },
    Internal {
        feature: String,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

// Wire shape of a node. Dispatch is on `node_type`: the literal "leaf" is a
// leaf, anything else is a branch (exporters write "internal").
#[derive(Deserialize)]
struct RawNode {
    node_type: String,
    prob_phish: Option<f64>,
    feature: Option<String>,
    threshold: Option<f64>,
    left: Option<Box<RawNode>>,
    right: Option<Box<RawNode>>,
}

impl TryFrom<RawNode> for TreeNode {
    type Error = ModelError;

    fn try_from(raw: RawNode) -> Result<Self, ModelError> {
        if raw.node_type == "leaf" {
            let prob_phish = raw.prob_phish.ok_or(ModelError::MissingField("prob_phish"))?;
            Ok(TreeNode::Leaf { prob_phish })
        } else {
            let feature = raw.feature.ok_or(ModelError::MissingField("feature"))?;
            let threshold = raw.threshold.ok_or(ModelError::MissingField("threshold"))?;
            let left = *raw.left.ok_or(ModelError::MissingField("left"))?;
            let right = *raw.right.ok_or(ModelError::MissingField("right"))?;
            Ok(TreeNode::Internal {
                feature,
                threshold,
                left: Box::new(left.try_into()?),
                right: Box::new(right.try_into()?),
            })
        }
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawNode::deserialize(deserializer)?;
        raw.try_into().map_err(serde::de::Error::custom)
    }
}

impl TreeNode {
    /// Descend to a leaf and return its probability. A feature name absent
    /// from the record evaluates as 0 so that models and extractors may
    /// evolve independently. Equality routes left.
    pub fn eval(&self, features: &FeatureRecord) -> f64 {
        match self {
            TreeNode::Leaf { prob_phish } => *prob_phish,
            TreeNode::Internal {
                feature,
                threshold,
                left,
                right,
            } => {
                let val = features.get(feature).unwrap_or(0.0);
                if val <= *threshold {
                    left.eval(features)
                } else {
                    right.eval(features)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn check_leaves(&self, index: usize) -> Result<(), ModelError> {
        match self {
            TreeNode::Leaf { prob_phish } => {
                if !(0.0..=1.0).contains(prob_phish) {
                    return Err(ModelError::BadProbability {
                        index,
                        prob: *prob_phish,
                    });
                }
                Ok(())
            }
            TreeNode::Internal { left, right, .. } => {
                left.check_leaves(index)?;
                right.check_leaves(index)
            }
        }
    }

    fn collect_features<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        if let TreeNode::Internal {
            feature,
            left,
            right,
            ..
        } = self
        {
            out.insert(feature.as_str());
            left.collect_features(out);
            right.collect_features(out);
        }
    }
}

/// An exported decision forest: an ordered sequence of trees whose leaf
/// probabilities are averaged. Read-only after load; safe to share across
/// concurrent scoring calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForestModel {
    /// Feature order the exporter trained with. Informational only.
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub trees: Vec<TreeNode>,
}

impl ForestModel {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let data = fs::read_to_string(&path).map_err(|e| ModelError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;
        Self::from_json(&data)
    }

    /// Mean of per-tree leaf probabilities, in tree order. An empty forest
    /// predicts 0; that is the defined "model unavailable" fallback, not an
    /// error.
    pub fn predict(&self, features: &FeatureRecord) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.eval(features)).sum();
        sum / self.trees.len() as f64
    }

    /// Reject malformed models at the load boundary: over-deep trees and
    /// leaf probabilities outside [0,1].
    pub fn validate(&self) -> Result<(), ModelError> {
        for (index, tree) in self.trees.iter().enumerate() {
            if tree.depth() > MAX_TREE_DEPTH {
                return Err(ModelError::TooDeep { index });
            }
            tree.check_leaves(index)?;
        }
        Ok(())
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Every feature name referenced by an internal node, deduplicated.
    pub fn referenced_features(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        for tree in &self.trees {
            tree.collect_features(&mut out);
        }
        out
    }
}
