use crate::{
    config::Config,
    features::{extract_lexical_features, FEATURE_NAMES},
    model::{ForestModel, ModelError},
    types::{badge_percent, ScoreResponse, Verdict},
};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Owns the loaded forest and the verdict thresholds. The model is
/// read-only after construction, so one engine can serve concurrent
/// scoring calls behind an `Arc` without coordination.
pub struct ScoringEngine {
    model: ForestModel,
    config: Config,
}

impl ScoringEngine {
    /// Load the model named by the config. A missing model file degrades to
    /// the empty forest (every URL scores 0) rather than failing startup;
    /// an unreadable or malformed file is an error.
    pub fn new(config: Config) -> Result<Self, ModelError> {
        let model = if Path::new(&config.model_path).exists() {
            let model = ForestModel::load(&config.model_path)?;
            model.validate()?;
            info!(
                path = %config.model_path,
                trees = model.tree_count(),
                "loaded forest model"
            );
            model
        } else {
            warn!(
                path = %config.model_path,
                "model file not found, scoring with empty forest"
            );
            ForestModel::default()
        };
        Self::with_model(model, config)
    }

    pub fn with_model(model: ForestModel, config: Config) -> Result<Self, ModelError> {
        model.validate()?;
        for name in model.referenced_features() {
            if !FEATURE_NAMES.contains(&name) {
                warn!(feature = name, "model references unknown feature, it will evaluate as 0");
            }
        }
        Ok(Self { model, config })
    }

    /// Score a raw URL string. Synchronous and infallible: malformed input
    /// degrades to empty-hostname features, an empty forest scores 0.
    pub fn score(&self, url: &str) -> ScoreResponse {
        let features = extract_lexical_features(url);
        let probability = self.model.predict(&features);
        let verdict = Verdict::from_probability(
            probability,
            self.config.threshold_suspicious,
            self.config.threshold_dangerous,
        );

        ScoreResponse {
            verdict,
            probability,
            percent: badge_percent(probability),
            advice: verdict.advice().to_string(),
            decision_id: Uuid::new_v4().to_string(),
            features,
        }
    }

    pub fn tree_count(&self) -> usize {
        self.model.tree_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;

    fn engine_with(trees: Vec<TreeNode>) -> ScoringEngine {
        let model = ForestModel {
            features: vec![],
            trees,
        };
        ScoringEngine::with_model(model, Config::default()).unwrap()
    }

    fn leaf(prob: f64) -> TreeNode {
        TreeNode::Leaf { prob_phish: prob }
    }

    #[test]
    fn scores_through_the_full_pipeline() {
        let split = TreeNode::Internal {
            feature: "has_ip".to_string(),
            threshold: 0.5,
            left: Box::new(leaf(0.1)),
            right: Box::new(leaf(0.9)),
        };
        let engine = engine_with(vec![split]);

        let safe = engine.score("https://example.com");
        assert_eq!(safe.probability, 0.1);
        assert_eq!(safe.verdict, Verdict::Safe);
        assert_eq!(safe.percent, 10);

        let risky = engine.score("http://10.0.0.1/login");
        assert_eq!(risky.probability, 0.9);
        assert_eq!(risky.verdict, Verdict::Dangerous);
        assert_eq!(risky.percent, 90);
        assert_ne!(safe.decision_id, risky.decision_id);
    }

    #[test]
    fn empty_forest_scores_everything_zero() {
        let engine = engine_with(vec![]);
        let resp = engine.score("http://very-suspicious-1234.example");
        assert_eq!(resp.probability, 0.0);
        assert_eq!(resp.verdict, Verdict::Safe);
        assert_eq!(resp.percent, 0);
    }

    #[test]
    fn verdict_tiers_follow_configured_thresholds() {
        let engine = engine_with(vec![leaf(0.4)]);
        assert_eq!(engine.score("anything").verdict, Verdict::Suspicious);

        let engine = engine_with(vec![leaf(0.7)]);
        assert_eq!(engine.score("anything").verdict, Verdict::Dangerous);
    }

    #[test]
    fn malformed_model_is_rejected_at_construction() {
        let model = ForestModel {
            features: vec![],
            trees: vec![leaf(2.0)],
        };
        assert!(ScoringEngine::with_model(model, Config::default()).is_err());
    }

    #[test]
    fn advice_matches_verdict() {
        let engine = engine_with(vec![leaf(0.95)]);
        let resp = engine.score("http://bad.example");
        assert_eq!(resp.advice, Verdict::Dangerous.advice());
    }
}
