//! Core domain types for chainmap attack-chain analysis.
//!
//! These types flow one way through the engine: raw `Vulnerability` records
//! become `AttackNode`s, nodes are linked by `AttackEdge`s, and ranked
//! `AttackPath`s land in the final `AnalysisResult`. Every stage produces a
//! new immutable value; nothing is mutated in place after construction.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Techniques & tactics ──────────────────────────────────────────

/// ATT&CK-style tactic categories: the attacker goal a technique serves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Tactic {
    InitialAccess,
    Execution,
    PrivilegeEscalation,
    CredentialAccess,
    LateralMovement,
    Collection,
    Exfiltration,
    Impact,
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tactic::InitialAccess => "Initial Access",
            Tactic::Execution => "Execution",
            Tactic::PrivilegeEscalation => "Privilege Escalation",
            Tactic::CredentialAccess => "Credential Access",
            Tactic::LateralMovement => "Lateral Movement",
            Tactic::Collection => "Collection",
            Tactic::Exfiltration => "Exfiltration",
            Tactic::Impact => "Impact",
        };
        f.write_str(name)
    }
}

/// A cataloged attack technique with its MITRE identifier.
///
/// Two techniques are equal iff their ids match; the name is display text
/// and carries no identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technique {
    /// MITRE ATT&CK identifier, e.g. "T1110".
    pub id: String,
    pub name: String,
    pub tactic: Tactic,
}

impl PartialEq for Technique {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Technique {}

impl std::hash::Hash for Technique {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ── Scan input ────────────────────────────────────────────────────

/// One raw finding from a vulnerability scan.
///
/// `id` must be unique within a single scan document; a collision is a
/// fatal validation error, not silently deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    #[serde(rename = "type")]
    pub vuln_type: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// The external scan document consumed by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanDocument {
    pub scan_date: NaiveDate,
    pub target: String,
    pub vulnerabilities: Vec<Vulnerability>,
}

// ── Derived graph entities ────────────────────────────────────────

/// A single exploit step derived from one vulnerability record.
///
/// `risk_score = severity * 0.7 + exploitability * 10 * 0.3`, clamped to
/// `[0, 10]`. Immutable once built; exactly one node per valid input record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackNode {
    /// Carried over from the source vulnerability; unique within one graph.
    pub id: String,
    pub vuln_type: String,
    pub technique_id: String,
    pub technique_name: String,
    pub tactic: Tactic,
    /// Consequence estimate, 1-10.
    pub severity: u8,
    /// Ease-of-exploitation estimate, 0-1.
    pub exploitability: f64,
    pub risk_score: f64,
    pub description: String,
}

/// A directed dependency: exploiting `source_id` enables `target_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttackEdge {
    pub source_id: String,
    pub target_id: String,
}

/// A ranked causal chain from an entry node to an objective node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackPath {
    /// Node ids in causal order, entry first.
    pub node_ids: Vec<String>,
    /// Sum of node risk scores along the chain.
    pub total_risk: f64,
    /// Weakest-link success probability for the whole chain, 0-1.
    pub likelihood: f64,
    /// Worst single consequence on the chain (max severity).
    pub impact: u8,
    /// Composite 0-100 score.
    pub score: f64,
    /// 1-based position after ranking.
    pub rank: usize,
}

// ── Results & warnings ────────────────────────────────────────────

/// A non-fatal degradation recorded during analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// A scan record whose type has no registry entry was skipped.
    UnknownVulnerabilityType {
        vulnerability_id: String,
        vuln_type: String,
    },
    /// A prerequisite edge was dropped because it would close a cycle.
    CycleRejected {
        source_id: String,
        target_id: String,
    },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::UnknownVulnerabilityType {
                vulnerability_id,
                vuln_type,
            } => write!(
                f,
                "skipped {vulnerability_id}: unknown vulnerability type {vuln_type:?}"
            ),
            AnalysisWarning::CycleRejected {
                source_id,
                target_id,
            } => write!(f, "rejected edge {source_id} -> {target_id}: would close a cycle"),
        }
    }
}

/// The engine's sole output for one scan. Immutable; safe to share across
/// concurrent readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub nodes: Vec<AttackNode>,
    pub edges: Vec<AttackEdge>,
    /// Rank-ordered, best chain first. At most `top_k` entries.
    pub paths: Vec<AttackPath>,
    /// True iff the enumerator's candidate cap was reached for at least one
    /// entry/objective pair; ranking then saw an incomplete candidate set.
    pub truncated: bool,
    pub warnings: Vec<AnalysisWarning>,
}
