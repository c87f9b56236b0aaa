//! Shrike — lexical URL phishing scorer.
//!
//! A URL string is mapped to a fixed 13-field feature record, which a
//! precomputed decision forest turns into a phishing probability in [0,1].
//! Both steps are pure and synchronous; the HTTP service in `main` is a
//! thin layer over them.

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod types;

pub use engine::ScoringEngine;
pub use features::{extract_lexical_features, FeatureRecord, FEATURE_NAMES};
pub use model::{ForestModel, TreeNode};
pub use types::{badge_percent, ScoreRequest, ScoreResponse, Verdict};
