use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Canonical feature order. Model exporters write this order into the
/// `features` array of the forest JSON; it must stay stable.
pub const FEATURE_NAMES: [&str; 13] = [
    "length",
    "hostname_length",
    "count_dots",
    "count_slashes",
    "count_hyphens",
    "has_ip",
    "count_query",
    "starts_with_https",
    "contains_at",
    "num_subdomains",
    "ratio_digits",
    "count_encoded",
    "tld_len",
];

// Dotted-quad shape only. Groups are 1-3 digits with no 0-255 bounds check.
static DOTTED_QUAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}$").expect("dotted-quad regex"));

/// Lexical features of a single URL string. Every field is always present
/// and numeric; parse failures zero the hostname-derived fields instead of
/// erroring.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub length: f64,
    pub hostname_length: f64,
    pub count_dots: f64,
    pub count_slashes: f64,
    pub count_hyphens: f64,
    pub has_ip: f64,
    pub count_query: f64,
    pub starts_with_https: f64,
    pub contains_at: f64,
    pub num_subdomains: f64,
    pub ratio_digits: f64,
    pub count_encoded: f64,
    pub tld_len: f64,
}

impl FeatureRecord {
    /// Look up a feature by its exported name. Unknown names return `None`;
    /// the evaluator treats that as 0 rather than failing, so models may
    /// reference features this extractor does not produce.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "length" => Some(self.length),
            "hostname_length" => Some(self.hostname_length),
            "count_dots" => Some(self.count_dots),
            "count_slashes" => Some(self.count_slashes),
            "count_hyphens" => Some(self.count_hyphens),
            "has_ip" => Some(self.has_ip),
            "count_query" => Some(self.count_query),
            "starts_with_https" => Some(self.starts_with_https),
            "contains_at" => Some(self.contains_at),
            "num_subdomains" => Some(self.num_subdomains),
            "ratio_digits" => Some(self.ratio_digits),
            "count_encoded" => Some(self.count_encoded),
            "tld_len" => Some(self.tld_len),
            _ => None,
        }
    }
}

/// Extract lexical features from a raw URL string.
///
/// Character counts are taken over the original string exactly as given.
/// A normalized copy (trimmed, scheme prepended when missing) exists only
/// to obtain a parseable hostname; it never feeds the counts. The function
/// accepts any input, including empty or malformed strings, and never
/// fails.
pub fn extract_lexical_features(url: &str) -> FeatureRecord {
    let host = parse_hostname(url);
    let labels: Vec<&str> = host.split('.').filter(|p| !p.is_empty()).collect();

    let length = url.chars().count();
    let digits = url.chars().filter(|c| c.is_ascii_digit()).count();

    FeatureRecord {
        length: length as f64,
        hostname_length: host.chars().count() as f64,
        count_dots: host.matches('.').count() as f64,
        count_slashes: url.matches('/').count() as f64,
        count_hyphens: url.matches('-').count() as f64,
        has_ip: if DOTTED_QUAD_RE.is_match(&host) { 1.0 } else { 0.0 },
        count_query: (url.matches('?').count() + url.matches('&').count()) as f64,
        starts_with_https: if url.to_lowercase().starts_with("https") { 1.0 } else { 0.0 },
        contains_at: if url.contains('@') { 1.0 } else { 0.0 },
        num_subdomains: labels.len().saturating_sub(2) as f64,
        ratio_digits: if length > 0 { digits as f64 / length as f64 } else { 0.0 },
        count_encoded: url.matches('%').count() as f64,
        tld_len: if labels.len() > 1 {
            labels.last().map_or(0, |l| l.chars().count()) as f64
        } else {
            0.0
        },
    }
}

/// Trim and prepend `http://` when no scheme prefix is present. Empty or
/// whitespace-only input has no obtainable host.
fn normalize_for_parsing(url: &str) -> Option<String> {
    let s = url.trim();
    if s.is_empty() {
        return None;
    }
    if s.starts_with("http://") || s.starts_with("https://") {
        Some(s.to_string())
    } else {
        Some(format!("http://{s}"))
    }
}

fn parse_hostname(url: &str) -> String {
    normalize_for_parsing(url)
        .and_then(|s| Url::parse(&s).ok())
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}
