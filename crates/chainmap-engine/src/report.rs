//! Plain-text analyst report rendering.
//!
//! Consumes a finished `AnalysisResult`; adds no analysis of its own.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::Utc;

use chainmap_core::types::{AnalysisResult, AttackNode, ScanDocument};

const RULE_HEAVY: &str = "================================================================================";
const RULE_LIGHT: &str = "--------------------------------------------------------------------------------";

/// Render the full threat-analysis report for one scan.
pub fn render_report(document: &ScanDocument, result: &AnalysisResult) -> String {
    let mut out = String::new();

    writeln!(out, "{RULE_HEAVY}").unwrap();
    writeln!(out, "ATTACK PATH ANALYSIS REPORT").unwrap();
    writeln!(out, "{RULE_HEAVY}").unwrap();
    writeln!(out, "Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC")).unwrap();
    writeln!(out, "Target: {}", document.target).unwrap();
    writeln!(out, "Scan Date: {}", document.scan_date).unwrap();
    writeln!(
        out,
        "Vulnerabilities Analyzed: {}",
        document.vulnerabilities.len()
    )
    .unwrap();
    writeln!(out, "Attack Paths Identified: {}", result.paths.len()).unwrap();
    if result.truncated {
        writeln!(
            out,
            "Note: candidate enumeration was truncated; ranking may be incomplete"
        )
        .unwrap();
    }
    writeln!(out, "{RULE_HEAVY}\n").unwrap();

    let by_id: HashMap<&str, &AttackNode> =
        result.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    if result.paths.is_empty() {
        writeln!(out, "No complete attack paths found.\n").unwrap();
    }

    for path in &result.paths {
        writeln!(out, "{RULE_LIGHT}").unwrap();
        writeln!(out, "ATTACK PATH #{}", path.rank).unwrap();
        writeln!(out, "{RULE_LIGHT}").unwrap();
        writeln!(out, "Score: {:.2}/100", path.score).unwrap();
        writeln!(out, "Total Risk: {:.2}", path.total_risk).unwrap();
        writeln!(out, "Likelihood: {:.0}%", path.likelihood * 100.0).unwrap();
        writeln!(out, "Impact: {}/10", path.impact).unwrap();
        writeln!(out, "\nAttack Chain:").unwrap();

        for (step, node_id) in path.node_ids.iter().enumerate() {
            let Some(node) = by_id.get(node_id.as_str()) else {
                continue;
            };
            writeln!(
                out,
                "  {}. [{}] {}",
                step + 1,
                node.technique_id,
                node.description
            )
            .unwrap();
            writeln!(out, "     Technique: {}", node.technique_name).unwrap();
            writeln!(out, "     Tactic: {}", node.tactic).unwrap();
            writeln!(
                out,
                "     Severity: {}/10 | Exploitability: {:.0}%",
                node.severity,
                node.exploitability * 100.0
            )
            .unwrap();
            writeln!(out).unwrap();
        }

        let chain: Vec<&str> = path
            .node_ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|n| n.description.as_str()))
            .collect();
        writeln!(out, "Full Path: {}\n", chain.join(" -> ")).unwrap();
    }

    if !result.warnings.is_empty() {
        writeln!(out, "{RULE_HEAVY}").unwrap();
        writeln!(out, "WARNINGS:").unwrap();
        writeln!(out, "{RULE_HEAVY}").unwrap();
        for warning in &result.warnings {
            writeln!(out, "- {warning}").unwrap();
        }
        writeln!(out).unwrap();
    }

    writeln!(out, "{RULE_HEAVY}").unwrap();
    writeln!(out, "RECOMMENDATIONS:").unwrap();
    writeln!(out, "{RULE_HEAVY}").unwrap();

    for (i, node) in remediation_order(result).iter().take(5).enumerate() {
        writeln!(out, "{}. Remediate: {}", i + 1, node.description).unwrap();
        writeln!(out, "   Priority: {}", priority_label(node.severity)).unwrap();
        writeln!(out).unwrap();
    }

    out
}

/// Nodes appearing on ranked paths, most risky first.
fn remediation_order(result: &AnalysisResult) -> Vec<&AttackNode> {
    let by_id: HashMap<&str, &AttackNode> =
        result.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut seen = Vec::new();
    for path in &result.paths {
        for id in &path.node_ids {
            if let Some(&node) = by_id.get(id.as_str()) {
                if !seen.iter().any(|n: &&AttackNode| n.id == node.id) {
                    seen.push(node);
                }
            }
        }
    }

    seen.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    seen
}

fn priority_label(severity: u8) -> &'static str {
    match severity {
        8..=10 => "CRITICAL",
        6..=7 => "HIGH",
        _ => "MEDIUM",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmap_core::CapabilityRegistry;

    use crate::demo;
    use crate::AnalysisEngine;

    #[test]
    fn test_report_lists_ranked_paths() {
        let engine = AnalysisEngine::new(CapabilityRegistry::builtin());
        let scan = demo::sample_scan();
        let result = engine.analyze_document(&scan).unwrap();
        assert!(!result.paths.is_empty());

        let report = render_report(&scan, &result);

        assert!(report.contains("ATTACK PATH ANALYSIS REPORT"));
        assert!(report.contains("Target: 192.168.1.100"));
        assert!(report.contains("ATTACK PATH #1"));
        assert!(report.contains("RECOMMENDATIONS:"));
        assert!(report.contains("T1048"));
    }

    #[test]
    fn test_report_handles_empty_result() {
        let engine = AnalysisEngine::new(CapabilityRegistry::builtin());
        let mut scan = demo::sample_scan();
        scan.vulnerabilities.clear();
        let result = engine.analyze_document(&scan).unwrap();

        let report = render_report(&scan, &result);
        assert!(report.contains("No complete attack paths found."));
    }

    #[test]
    fn test_priority_labels() {
        assert_eq!(priority_label(10), "CRITICAL");
        assert_eq!(priority_label(8), "CRITICAL");
        assert_eq!(priority_label(7), "HIGH");
        assert_eq!(priority_label(5), "MEDIUM");
    }
}
