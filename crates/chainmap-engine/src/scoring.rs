//! Risk model and path ranking.
//!
//! Node risk: `severity * 0.7 + exploitability * 10 * 0.3`, clamped to
//! `[0, 10]`.
//!
//! Path score: `max_score * (risk_weight * total_risk / (10 * reference_len)
//! + likelihood_weight * likelihood + impact_weight * impact / 10)` with the
//! risk term saturating at `risk_weight`. Likelihood is the weakest link:
//! the minimum exploitability along the chain. With the default
//! coefficients a maximal three-step chain scores 100.

use std::cmp::Ordering;

use chainmap_core::config::ScoringConfig;
use chainmap_core::types::AttackPath;

use crate::enumerate::Candidate;
use crate::graph::AttackGraph;

/// Weighted risk score for a single attack node, in `[0, 10]`.
pub fn node_risk_score(severity: u8, exploitability: f64) -> f64 {
    (f64::from(severity) * 0.7 + exploitability * 10.0 * 0.3).clamp(0.0, 10.0)
}

/// Derived metrics for one candidate chain.
#[derive(Debug, Clone, Copy)]
pub struct PathMetrics {
    pub total_risk: f64,
    pub likelihood: f64,
    pub impact: u8,
    pub score: f64,
}

/// Score one candidate. Candidates are non-empty by construction.
pub fn score_candidate(
    graph: &AttackGraph,
    candidate: &Candidate,
    config: &ScoringConfig,
) -> PathMetrics {
    let mut total_risk = 0.0;
    let mut likelihood = 1.0f64;
    let mut impact = 0u8;

    for &idx in candidate {
        let node = &graph.nodes[idx];
        total_risk += node.risk_score;
        likelihood = likelihood.min(node.exploitability);
        impact = impact.max(node.severity);
    }

    let reference_risk = 10.0 * config.reference_chain_len as f64;
    let risk_term = (total_risk / reference_risk).min(1.0);
    let score = config.max_score
        * (config.risk_weight * risk_term
            + config.likelihood_weight * likelihood
            + config.impact_weight * f64::from(impact) / 10.0);

    PathMetrics {
        total_risk,
        likelihood,
        impact,
        score: score.clamp(0.0, config.max_score),
    }
}

/// Score all candidates and return the top `top_k` as ranked attack paths.
///
/// Order: score descending, then shorter chains first, then lexical order of
/// the node-id sequence so identical inputs always rank identically.
pub fn rank_candidates(
    graph: &AttackGraph,
    candidates: &[Candidate],
    config: &ScoringConfig,
    top_k: usize,
) -> Vec<AttackPath> {
    let mut paths: Vec<AttackPath> = candidates
        .iter()
        .map(|candidate| {
            let metrics = score_candidate(graph, candidate, config);
            AttackPath {
                node_ids: candidate
                    .iter()
                    .map(|&idx| graph.nodes[idx].id.clone())
                    .collect(),
                total_risk: metrics.total_risk,
                likelihood: metrics.likelihood,
                impact: metrics.impact,
                score: metrics.score,
                rank: 0,
            }
        })
        .collect();

    paths.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.node_ids.len().cmp(&b.node_ids.len()))
            .then_with(|| a.node_ids.cmp(&b.node_ids))
    });
    paths.truncate(top_k);

    for (i, path) in paths.iter_mut().enumerate() {
        path.rank = i + 1;
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmap_core::registry::{Capability, CapabilityRegistry};
    use chainmap_core::types::{Tactic, Technique, Vulnerability};

    use crate::graph::AttackGraph;
    use crate::mapper::map_vulnerabilities;

    fn capability(
        technique_id: &str,
        tactic: Tactic,
        severity: u8,
        exploitability: f64,
        prereqs: &[&str],
    ) -> Capability {
        Capability {
            technique: Technique {
                id: technique_id.to_string(),
                name: technique_id.to_string(),
                tactic,
            },
            severity,
            exploitability,
            prerequisites: prereqs.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn vuln(id: &str, vuln_type: &str) -> Vulnerability {
        Vulnerability {
            id: id.to_string(),
            vuln_type: vuln_type.to_string(),
            description: String::new(),
            port: None,
            service: None,
        }
    }

    /// Three-step chain with severities [9, 9, 10] and exploitabilities
    /// [0.8, 0.6, 0.8].
    fn reference_chain() -> AttackGraph {
        let mut registry = CapabilityRegistry::empty();
        registry
            .insert("foothold", capability("T0001", Tactic::InitialAccess, 9, 0.8, &[]))
            .unwrap();
        registry
            .insert(
                "escalate",
                capability("T0002", Tactic::PrivilegeEscalation, 9, 0.6, &["foothold"]),
            )
            .unwrap();
        registry
            .insert(
                "exfil",
                capability("T0003", Tactic::Exfiltration, 10, 0.8, &["escalate"]),
            )
            .unwrap();

        let vulns = vec![vuln("a", "foothold"), vuln("b", "escalate"), vuln("c", "exfil")];
        let (nodes, _) = map_vulnerabilities(&vulns, &registry, false).unwrap();
        AttackGraph::build(nodes, &registry).0
    }

    #[test]
    fn test_node_risk_score_formula() {
        // 9 * 0.7 + 0.8 * 10 * 0.3 = 6.3 + 2.4 = 8.7
        assert!((node_risk_score(9, 0.8) - 8.7).abs() < 1e-9);
        // Maximal node saturates exactly at 10.
        assert!((node_risk_score(10, 1.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_reference_chain_scores_84_40() {
        let graph = reference_chain();
        let config = ScoringConfig::default();

        let metrics = score_candidate(&graph, &vec![0, 1, 2], &config);

        // risk scores: 8.7 + 8.1 + 9.4 = 26.2
        assert!((metrics.total_risk - 26.2).abs() < 0.01);
        assert!((metrics.likelihood - 0.6).abs() < 1e-9);
        assert_eq!(metrics.impact, 10);
        // 100 * (0.6 * 26.2/30 + 0.2 * 0.6 + 0.2 * 1.0) = 84.40
        assert!((metrics.score - 84.40).abs() < 0.01);
    }

    #[test]
    fn test_maximal_three_step_chain_scores_100() {
        let mut registry = CapabilityRegistry::empty();
        registry
            .insert("s1", capability("T0001", Tactic::InitialAccess, 10, 1.0, &[]))
            .unwrap();
        registry
            .insert("s2", capability("T0002", Tactic::Execution, 10, 1.0, &["s1"]))
            .unwrap();
        registry
            .insert("s3", capability("T0003", Tactic::Impact, 10, 1.0, &["s2"]))
            .unwrap();

        let vulns = vec![vuln("a", "s1"), vuln("b", "s2"), vuln("c", "s3")];
        let (nodes, _) = map_vulnerabilities(&vulns, &registry, false).unwrap();
        let (graph, _) = AttackGraph::build(nodes, &registry);

        let metrics = score_candidate(&graph, &vec![0, 1, 2], &ScoringConfig::default());
        assert!((metrics.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_in_severity_and_exploitability() {
        let base = node_risk_score(5, 0.5);
        assert!(node_risk_score(6, 0.5) > base);
        assert!(node_risk_score(5, 0.6) > base);

        // A higher-exploitability step never lowers the path score.
        let graph = reference_chain();
        let config = ScoringConfig::default();
        let before = score_candidate(&graph, &vec![0, 1, 2], &config).score;

        let mut boosted = reference_chain();
        boosted.nodes[1].exploitability = 0.9;
        boosted.nodes[1].risk_score = node_risk_score(9, 0.9);
        let after = score_candidate(&boosted, &vec![0, 1, 2], &config).score;

        assert!(after >= before);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let graph = reference_chain();
        let config = ScoringConfig::default();

        let candidates = vec![vec![0], vec![0, 1], vec![0, 1, 2]];
        let ranked = rank_candidates(&graph, &candidates, &config, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert!(ranked[0].score >= ranked[1].score);
        // The full chain dominates: more risk, same impact.
        assert_eq!(ranked[0].node_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tie_broken_by_length_then_ids() {
        let graph = reference_chain();
        let config = ScoringConfig::default();

        // The same candidate listed twice ties exactly; ordering falls back
        // to the lexical node-id comparison and stays deterministic.
        let candidates = vec![vec![0, 1, 2], vec![0, 1, 2]];
        let first = rank_candidates(&graph, &candidates, &config, 5);
        let second = rank_candidates(&graph, &candidates, &config, 5);

        let a: Vec<_> = first.iter().map(|p| p.node_ids.clone()).collect();
        let b: Vec<_> = second.iter().map(|p| p.node_ids.clone()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_candidates_empty_paths() {
        let graph = reference_chain();
        let ranked = rank_candidates(&graph, &[], &ScoringConfig::default(), 5);
        assert!(ranked.is_empty());
    }
}
