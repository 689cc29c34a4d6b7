//! Synthetic demo scan generation.
//!
//! Produces a small, plausible scan document exercising most of the builtin
//! registry, for trying the tool without a real scanner.

use std::path::Path;

use chrono::NaiveDate;

use chainmap_core::error::Result;
use chainmap_core::types::{ScanDocument, Vulnerability};

/// The bundled six-finding demo scan against a single host.
pub fn sample_scan() -> ScanDocument {
    let vulnerabilities = vec![
        Vulnerability {
            id: "ssh_weak_auth".to_string(),
            vuln_type: "ssh_weak_auth".to_string(),
            description: "SSH with weak password authentication".to_string(),
            port: Some(22),
            service: Some("SSH".to_string()),
        },
        Vulnerability {
            id: "web_sqli".to_string(),
            vuln_type: "web_sqli".to_string(),
            description: "SQL injection in login form".to_string(),
            port: Some(80),
            service: Some("HTTP".to_string()),
        },
        Vulnerability {
            id: "misconfigured_s3".to_string(),
            vuln_type: "misconfigured_s3".to_string(),
            description: "Publicly accessible S3 bucket".to_string(),
            port: None,
            service: Some("AWS S3".to_string()),
        },
        Vulnerability {
            id: "privilege_escalation".to_string(),
            vuln_type: "privilege_escalation".to_string(),
            description: "Sudo misconfiguration allows privilege escalation".to_string(),
            port: None,
            service: Some("Linux".to_string()),
        },
        Vulnerability {
            id: "credential_reuse".to_string(),
            vuln_type: "credential_reuse".to_string(),
            description: "Same credentials used across multiple services".to_string(),
            port: None,
            service: Some("Multiple".to_string()),
        },
        Vulnerability {
            id: "data_exfiltration".to_string(),
            vuln_type: "data_exfiltration".to_string(),
            description: "No egress filtering - data exfiltration possible".to_string(),
            port: None,
            service: Some("Network".to_string()),
        },
    ];

    ScanDocument {
        scan_date: NaiveDate::from_ymd_opt(2026, 2, 5).expect("valid date"),
        target: "192.168.1.100".to_string(),
        vulnerabilities,
    }
}

/// Write the demo scan as pretty-printed JSON.
pub fn write_sample_scan(path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&sample_scan())?;
    std::fs::write(path, json)?;
    Ok(())
}
