//! Engine configuration.
//!
//! Loaded from `chainmap.toml` or `CHAINMAP_` environment variables by the
//! CLI, or constructed directly by hosts and tests. All limits and scoring
//! coefficients live here; the engine has no module-level tunables.

use serde::Deserialize;

use crate::types::Tactic;

/// Top-level engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Number of ranked paths to return.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum nodes in a candidate path. Longer chains are pruned during
    /// enumeration without marking the result truncated.
    #[serde(default = "default_max_path_len")]
    pub max_path_len: usize,

    /// Candidate cap per (entry, objective) pair. Hitting it stops
    /// enumeration for that pair and marks the result truncated.
    #[serde(default = "default_max_candidates")]
    pub max_candidates_per_pair: usize,

    /// Fail the run on a vulnerability type missing from the registry
    /// instead of skipping the record with a warning.
    #[serde(default)]
    pub strict_unknown_types: bool,

    /// Tactics that mark a node as a terminal attacker objective.
    #[serde(default = "default_terminal_tactics")]
    pub terminal_tactics: Vec<Tactic>,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_path_len: default_max_path_len(),
            max_candidates_per_pair: default_max_candidates(),
            strict_unknown_types: false,
            terminal_tactics: default_terminal_tactics(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Composite-score coefficients.
///
/// `score = max_score * (risk_weight * total_risk / (10 * reference_chain_len)
///          + likelihood_weight * likelihood + impact_weight * impact / 10)`
///
/// with the risk term capped at `risk_weight`. The defaults make a
/// maximal-severity, maximal-exploitability three-step chain score 100.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_risk_weight")]
    pub risk_weight: f64,
    #[serde(default = "default_likelihood_weight")]
    pub likelihood_weight: f64,
    #[serde(default = "default_impact_weight")]
    pub impact_weight: f64,
    /// Chain length at which the additive risk term saturates.
    #[serde(default = "default_reference_chain_len")]
    pub reference_chain_len: usize,
    /// Score ceiling (default 100).
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            risk_weight: default_risk_weight(),
            likelihood_weight: default_likelihood_weight(),
            impact_weight: default_impact_weight(),
            reference_chain_len: default_reference_chain_len(),
            max_score: default_max_score(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_max_path_len() -> usize {
    8
}

fn default_max_candidates() -> usize {
    100
}

fn default_terminal_tactics() -> Vec<Tactic> {
    vec![Tactic::Exfiltration, Tactic::Impact]
}

fn default_risk_weight() -> f64 {
    0.6
}

fn default_likelihood_weight() -> f64 {
    0.2
}

fn default_impact_weight() -> f64 {
    0.2
}

fn default_reference_chain_len() -> usize {
    3
}

fn default_max_score() -> f64 {
    100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_path_len, 8);
        assert_eq!(config.max_candidates_per_pair, 100);
        assert!(!config.strict_unknown_types);
        assert_eq!(
            config.terminal_tactics,
            vec![Tactic::Exfiltration, Tactic::Impact]
        );
    }

    #[test]
    fn test_scoring_weights_sum_to_one() {
        let scoring = ScoringConfig::default();
        let sum = scoring.risk_weight + scoring.likelihood_weight + scoring.impact_weight;
        assert!((sum - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let raw = r#"{ "top_k": 10, "strict_unknown_types": true }"#;
        let config: EngineConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.top_k, 10);
        assert!(config.strict_unknown_types);
        assert_eq!(config.max_path_len, 8);
        assert!((config.scoring.max_score - 100.0).abs() < f64::EPSILON);
    }
}
