//! Attack graph construction.
//!
//! Links attack nodes into a directed graph using the registry's
//! prerequisite relationships, stored as a compact adjacency list over dense
//! node indices for cheap traversal during path enumeration.
//!
//! The graph is a DAG by construction: an edge that would close a cycle is
//! rejected with a warning instead of inserted, which guarantees the path
//! enumerator terminates.

use std::collections::HashMap;

use chainmap_core::registry::CapabilityRegistry;
use chainmap_core::types::{AnalysisWarning, AttackEdge, AttackNode, Tactic};

/// The in-memory attack graph for one scan.
#[derive(Debug)]
pub struct AttackGraph {
    /// All nodes, indexed by dense index in input order.
    pub nodes: Vec<AttackNode>,
    /// `adjacency[i]` = dense indices of nodes enabled by exploiting `i`.
    pub adjacency: Vec<Vec<usize>>,
    /// Incoming edge count per node, for entry-point detection.
    pub incoming: Vec<usize>,
    /// Original node id -> dense index.
    pub node_index: HashMap<String, usize>,
}

impl AttackGraph {
    /// Build the graph from mapped nodes.
    ///
    /// For each node `N` and each prerequisite type `p` of `N`'s capability,
    /// an edge is added from every node of type `p` to `N`. Several nodes of
    /// the same type each produce their own edge (independent findings all
    /// satisfy the prerequisite).
    pub fn build(
        nodes: Vec<AttackNode>,
        registry: &CapabilityRegistry,
    ) -> (Self, Vec<AnalysisWarning>) {
        let mut node_index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            node_index.insert(node.id.clone(), i);
        }

        let mut graph = Self {
            adjacency: vec![Vec::new(); nodes.len()],
            incoming: vec![0; nodes.len()],
            nodes,
            node_index,
        };

        let mut by_type: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, node) in graph.nodes.iter().enumerate() {
            by_type.entry(node.vuln_type.as_str()).or_default().push(i);
        }
        let mut warnings = Vec::new();

        for target in 0..graph.nodes.len() {
            let Some(capability) = registry.get(&graph.nodes[target].vuln_type) else {
                // Mapper only emits registry-backed nodes; a miss here means
                // the caller built nodes against a different registry.
                continue;
            };
            for prereq_type in &capability.prerequisites {
                let Some(sources) = by_type.get(prereq_type.as_str()) else {
                    continue;
                };
                for &source in sources {
                    if source == target || graph.adjacency[source].contains(&target) {
                        continue;
                    }
                    if graph.reaches(target, source) {
                        tracing::warn!(
                            source_id = %graph.nodes[source].id,
                            target_id = %graph.nodes[target].id,
                            "rejecting prerequisite edge that would close a cycle"
                        );
                        warnings.push(AnalysisWarning::CycleRejected {
                            source_id: graph.nodes[source].id.clone(),
                            target_id: graph.nodes[target].id.clone(),
                        });
                        continue;
                    }
                    graph.adjacency[source].push(target);
                    graph.incoming[target] += 1;
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            rejected = warnings.len(),
            "built attack graph"
        );

        (graph, warnings)
    }

    /// Whether `to` is reachable from `from` along existing edges.
    fn reaches(&self, from: usize, to: usize) -> bool {
        if from == to {
            return true;
        }
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if std::mem::replace(&mut visited[node], true) {
                continue;
            }
            stack.extend(self.adjacency[node].iter().copied());
        }
        false
    }

    /// Dense indices of nodes with no incoming edge.
    pub fn entry_nodes(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.incoming[i] == 0)
            .collect()
    }

    /// Dense indices of objective nodes: those whose tactic is terminal, or,
    /// when no node carries a terminal tactic, those with no outgoing edge.
    pub fn objective_nodes(&self, terminal_tactics: &[Tactic]) -> Vec<usize> {
        let terminal: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| terminal_tactics.contains(&self.nodes[i].tactic))
            .collect();
        if !terminal.is_empty() {
            return terminal;
        }
        (0..self.nodes.len())
            .filter(|&i| self.adjacency[i].is_empty())
            .collect()
    }

    /// The edge set in deterministic order, for the analysis result.
    pub fn edges(&self) -> Vec<AttackEdge> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (source, targets) in self.adjacency.iter().enumerate() {
            for &target in targets {
                edges.push(AttackEdge {
                    source_id: self.nodes[source].id.clone(),
                    target_id: self.nodes[target].id.clone(),
                });
            }
        }
        edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmap_core::registry::{Capability, CapabilityRegistry};
    use chainmap_core::types::Technique;

    use crate::mapper::map_vulnerabilities;
    use chainmap_core::types::Vulnerability;

    fn vuln(id: &str, vuln_type: &str) -> Vulnerability {
        Vulnerability {
            id: id.to_string(),
            vuln_type: vuln_type.to_string(),
            description: format!("{vuln_type} finding"),
            port: None,
            service: None,
        }
    }

    fn build_from(vulns: &[Vulnerability], registry: &CapabilityRegistry) -> (AttackGraph, Vec<AnalysisWarning>) {
        let (nodes, _) = map_vulnerabilities(vulns, registry, false).unwrap();
        AttackGraph::build(nodes, registry)
    }

    fn entry(vuln_type: &str, technique_id: &str, tactic: Tactic, prereqs: &[&str]) -> Capability {
        Capability {
            technique: Technique {
                id: technique_id.to_string(),
                name: vuln_type.to_string(),
                tactic,
            },
            severity: 5,
            exploitability: 0.5,
            prerequisites: prereqs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_prerequisite_edges() {
        let registry = CapabilityRegistry::builtin();
        let vulns = vec![
            vuln("ssh", "ssh_weak_auth"),
            vuln("pe", "privilege_escalation"),
            vuln("exfil", "data_exfiltration"),
        ];

        let (graph, warnings) = build_from(&vulns, &registry);

        assert!(warnings.is_empty());
        assert_eq!(graph.node_count(), 3);
        // ssh -> pe (prereq), pe -> exfil (prereq). No s3 node, so only one
        // edge into exfil.
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.entry_nodes(), vec![0]);
        assert_eq!(
            graph.objective_nodes(&[Tactic::Exfiltration, Tactic::Impact]),
            vec![2]
        );
    }

    #[test]
    fn test_multi_edge_fan_out_same_type() {
        // Scenario: two distinct SSH findings both satisfy the privilege
        // escalation prerequisite, each with its own edge.
        let registry = CapabilityRegistry::builtin();
        let vulns = vec![
            vuln("ssh-a", "ssh_weak_auth"),
            vuln("ssh-b", "ssh_weak_auth"),
            vuln("pe", "privilege_escalation"),
        ];

        let (graph, _) = build_from(&vulns, &registry);

        assert_eq!(graph.edge_count(), 2);
        let edges = graph.edges();
        assert!(edges.contains(&AttackEdge {
            source_id: "ssh-a".to_string(),
            target_id: "pe".to_string(),
        }));
        assert!(edges.contains(&AttackEdge {
            source_id: "ssh-b".to_string(),
            target_id: "pe".to_string(),
        }));
    }

    #[test]
    fn test_cycle_rejected_with_warning() {
        // a requires b, b requires a: whichever edge lands second is dropped.
        let mut registry = CapabilityRegistry::empty();
        registry
            .insert("type_a", entry("type_a", "T0001", Tactic::InitialAccess, &["type_b"]))
            .unwrap();
        registry
            .insert("type_b", entry("type_b", "T0002", Tactic::Execution, &["type_a"]))
            .unwrap();

        let vulns = vec![vuln("a", "type_a"), vuln("b", "type_b")];
        let (graph, warnings) = build_from(&vulns, &registry);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            AnalysisWarning::CycleRejected { .. }
        ));
    }

    #[test]
    fn test_self_prerequisite_rejected_silently() {
        let mut registry = CapabilityRegistry::empty();
        registry
            .insert("loop", entry("loop", "T0003", Tactic::Execution, &["loop"]))
            .unwrap();

        let (graph, warnings) = build_from(&[vuln("x", "loop")], &registry);
        assert_eq!(graph.edge_count(), 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_objective_fallback_to_sinks() {
        // No terminal tactic anywhere: sinks become the objectives.
        let registry = CapabilityRegistry::builtin();
        let vulns = vec![vuln("ssh", "ssh_weak_auth"), vuln("pe", "privilege_escalation")];

        let (graph, _) = build_from(&vulns, &registry);
        let objectives = graph.objective_nodes(&[Tactic::Exfiltration, Tactic::Impact]);
        assert_eq!(objectives, vec![1]); // pe has no outgoing edge
    }

    #[test]
    fn test_no_orphan_edges() {
        let registry = CapabilityRegistry::builtin();
        let vulns = vec![
            vuln("ssh", "ssh_weak_auth"),
            vuln("sqli", "web_sqli"),
            vuln("pe", "privilege_escalation"),
            vuln("exfil", "data_exfiltration"),
        ];

        let (graph, _) = build_from(&vulns, &registry);
        for edge in graph.edges() {
            assert!(graph.node_index.contains_key(&edge.source_id));
            assert!(graph.node_index.contains_key(&edge.target_id));
        }
    }

    #[test]
    fn test_missing_prerequisite_type_produces_no_edge() {
        let registry = CapabilityRegistry::builtin();
        // Exfil's prerequisites (privilege_escalation, misconfigured_s3) are
        // absent from the scan; the node stands alone.
        let (graph, warnings) = build_from(&[vuln("exfil", "data_exfiltration")], &registry);

        assert!(warnings.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.entry_nodes(), vec![0]);
    }

    #[test]
    fn test_disconnected_graph_is_valid() {
        let registry = CapabilityRegistry::builtin();
        // Two independent attack vectors with no shared edges.
        let vulns = vec![vuln("xss", "web_xss"), vuln("s3", "misconfigured_s3")];

        let (graph, _) = build_from(&vulns, &registry);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.entry_nodes().len(), 2);
    }
}
