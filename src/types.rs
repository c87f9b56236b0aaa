use crate::features::FeatureRecord;
use serde::{Deserialize, Serialize};

/// Three-tier rating derived from the phishing probability. The tier
/// boundaries (0.4 and 0.7, inclusive lower bound per tier) are a contract
/// shared with badge-style consumers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Safe,
    Suspicious,
    Dangerous,
}

impl Verdict {
    pub fn from_probability(prob: f64, suspicious: f64, dangerous: f64) -> Self {
        if prob >= dangerous {
            Verdict::Dangerous
        } else if prob >= suspicious {
            Verdict::Suspicious
        } else {
            Verdict::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "SAFE",
            Verdict::Suspicious => "SUSPICIOUS",
            Verdict::Dangerous => "DANGEROUS",
        }
    }

    /// User-facing one-liner for the verdict.
    pub fn advice(&self) -> &'static str {
        match self {
            Verdict::Safe => "This website appears normal and safe to browse.",
            Verdict::Suspicious => "This website shows unusual patterns. Exercise caution.",
            Verdict::Dangerous => "Multiple risk signals detected. Avoid interacting with this site.",
        }
    }
}

/// Probability rendered as the 0-100 integer badge consumers display.
pub fn badge_percent(prob: f64) -> u8 {
    (prob * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub verdict: Verdict,
    pub probability: f64,
    pub percent: u8,
    pub advice: String,
    pub decision_id: String,
    pub features: FeatureRecord,
}
