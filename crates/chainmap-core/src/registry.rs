//! The capability registry: vulnerability type -> attack capability.
//!
//! The registry is data, not logic. Each entry describes the technique a
//! vulnerability type maps to, its base severity and exploitability, and the
//! vulnerability types an attacker must already hold to exploit it. Adding
//! coverage for a new vulnerability type means adding an entry here (or in a
//! registry file loaded at startup) and never touches engine code.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChainmapError, Result};
use crate::types::{Tactic, Technique};

/// One registry entry: what exploiting a vulnerability type means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub technique: Technique,
    /// Base severity, 1-10.
    pub severity: u8,
    /// Exploitability estimate, 0-1.
    pub exploitability: f64,
    /// Vulnerability types whose exploitation enables this one.
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl Capability {
    fn validate(&self, vuln_type: &str) -> Result<()> {
        if !(1..=10).contains(&self.severity) {
            return Err(ChainmapError::Registry(format!(
                "{vuln_type}: severity {} outside 1-10",
                self.severity
            )));
        }
        if !(0.0..=1.0).contains(&self.exploitability) {
            return Err(ChainmapError::Registry(format!(
                "{vuln_type}: exploitability {} outside 0-1",
                self.exploitability
            )));
        }
        Ok(())
    }
}

/// Read-only (after load) table of vulnerability-type capabilities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityRegistry {
    entries: BTreeMap<String, Capability>,
}

impl CapabilityRegistry {
    /// An empty registry. Useful for tests that build a bespoke table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The builtin capability catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for (vuln_type, technique_id, name, tactic, severity, exploitability, prereqs) in [
            (
                "ssh_weak_auth",
                "T1110",
                "Brute Force",
                Tactic::CredentialAccess,
                7,
                0.7,
                vec![],
            ),
            (
                "open_port",
                "T1190",
                "Exploit Public-Facing Application",
                Tactic::InitialAccess,
                5,
                0.5,
                vec![],
            ),
            (
                "web_sqli",
                "T1190",
                "SQL Injection",
                Tactic::InitialAccess,
                9,
                0.8,
                vec![],
            ),
            (
                "web_xss",
                "T1189",
                "Cross-Site Scripting",
                Tactic::InitialAccess,
                6,
                0.6,
                vec![],
            ),
            (
                "misconfigured_s3",
                "T1552",
                "Unsecured Credentials",
                Tactic::CredentialAccess,
                8,
                0.9,
                vec![],
            ),
            (
                "privilege_escalation",
                "T1068",
                "Exploitation for Privilege Escalation",
                Tactic::PrivilegeEscalation,
                9,
                0.6,
                vec!["ssh_weak_auth", "web_sqli"],
            ),
            (
                "credential_reuse",
                "T1078",
                "Valid Accounts",
                Tactic::InitialAccess,
                7,
                0.7,
                vec!["ssh_weak_auth", "web_sqli"],
            ),
            (
                "credential_dumping",
                "T1003",
                "OS Credential Dumping",
                Tactic::CredentialAccess,
                9,
                0.5,
                vec!["privilege_escalation"],
            ),
            (
                "lateral_movement",
                "T1021",
                "Remote Services",
                Tactic::LateralMovement,
                8,
                0.6,
                vec!["credential_reuse", "credential_dumping"],
            ),
            (
                "data_exfiltration",
                "T1048",
                "Exfiltration Over Alternative Protocol",
                Tactic::Exfiltration,
                10,
                0.8,
                vec!["privilege_escalation", "misconfigured_s3"],
            ),
        ] {
            let capability = Capability {
                technique: Technique {
                    id: technique_id.to_string(),
                    name: name.to_string(),
                    tactic,
                },
                severity,
                exploitability,
                prerequisites: prereqs.into_iter().map(str::to_string).collect(),
            };
            // Builtin entries are range-checked at construction.
            registry
                .insert(vuln_type, capability)
                .expect("builtin registry entry is valid");
        }
        registry
    }

    /// Look up the capability for a vulnerability type.
    pub fn get(&self, vuln_type: &str) -> Option<&Capability> {
        self.entries.get(vuln_type)
    }

    /// Add one entry, validating its ranges. Re-inserting an existing type
    /// replaces it, which lets a registry file override builtin estimates.
    pub fn insert(&mut self, vuln_type: &str, capability: Capability) -> Result<()> {
        capability.validate(vuln_type)?;
        self.entries.insert(vuln_type.to_string(), capability);
        Ok(())
    }

    /// Load a full registry from a JSON table of `type -> capability`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, Capability> = serde_json::from_str(&raw)?;

        let mut registry = Self::default();
        for (vuln_type, capability) in entries {
            registry.insert(&vuln_type, capability)?;
        }
        Ok(registry)
    }

    /// Extend this registry with the entries of a JSON table. Entries in the
    /// file win on type collisions.
    pub fn merge_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let other = Self::from_json_file(path)?;
        for (vuln_type, capability) in other.entries {
            self.entries.insert(vuln_type, capability);
        }
        Ok(())
    }

    /// Iterate entries in deterministic (lexical) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Capability)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
