//! Vulnerability mapper: raw scan records -> attack nodes.
//!
//! Each record is resolved against the capability registry. Records whose
//! type has no registry entry are skipped with a warning (or fail the run in
//! strict mode); a duplicate record id is always fatal because ambiguous
//! node identity would corrupt the graph.

use std::collections::HashSet;

use chainmap_core::error::{ChainmapError, Result};
use chainmap_core::registry::CapabilityRegistry;
use chainmap_core::types::{AnalysisWarning, AttackNode, Vulnerability};

use crate::scoring;

/// Map scan records to attack nodes, in input order.
///
/// Returns the nodes plus any skip warnings. The only side effect is the
/// `tracing` output accompanying each warning.
pub fn map_vulnerabilities(
    vulnerabilities: &[Vulnerability],
    registry: &CapabilityRegistry,
    strict: bool,
) -> Result<(Vec<AttackNode>, Vec<AnalysisWarning>)> {
    let mut nodes = Vec::with_capacity(vulnerabilities.len());
    let mut warnings = Vec::new();
    let mut seen_ids = HashSet::with_capacity(vulnerabilities.len());

    for vuln in vulnerabilities {
        if !seen_ids.insert(vuln.id.as_str()) {
            return Err(ChainmapError::DuplicateVulnerabilityId {
                id: vuln.id.clone(),
            });
        }

        let Some(capability) = registry.get(&vuln.vuln_type) else {
            if strict {
                return Err(ChainmapError::UnknownVulnerabilityType {
                    vulnerability_id: vuln.id.clone(),
                    vuln_type: vuln.vuln_type.clone(),
                });
            }
            tracing::warn!(
                vulnerability_id = %vuln.id,
                vuln_type = %vuln.vuln_type,
                "skipping record with unknown vulnerability type"
            );
            warnings.push(AnalysisWarning::UnknownVulnerabilityType {
                vulnerability_id: vuln.id.clone(),
                vuln_type: vuln.vuln_type.clone(),
            });
            continue;
        };

        nodes.push(AttackNode {
            id: vuln.id.clone(),
            vuln_type: vuln.vuln_type.clone(),
            technique_id: capability.technique.id.clone(),
            technique_name: capability.technique.name.clone(),
            tactic: capability.technique.tactic,
            severity: capability.severity,
            exploitability: capability.exploitability,
            risk_score: scoring::node_risk_score(capability.severity, capability.exploitability),
            description: vuln.description.clone(),
        });
    }

    tracing::debug!(
        input = vulnerabilities.len(),
        mapped = nodes.len(),
        skipped = warnings.len(),
        "mapped vulnerabilities to attack nodes"
    );

    Ok((nodes, warnings))
}
