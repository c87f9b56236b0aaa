use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub model_path: String,
    pub threshold_suspicious: f64,
    pub threshold_dangerous: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("SHRIKE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            model_path: env::var("SHRIKE_MODEL")
                .unwrap_or_else(|_| "./model_rules.json".to_string()),
            threshold_suspicious: env::var("SHRIKE_THRESH_SUSPICIOUS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.4),
            threshold_dangerous: env::var("SHRIKE_THRESH_DANGEROUS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.7),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            model_path: "./model_rules.json".to_string(),
            threshold_suspicious: 0.4,
            threshold_dangerous: 0.7,
        }
    }
}
