//! chainmap-engine: attack-graph construction and risk-ranked path
//! enumeration.
//!
//! Maps raw vulnerability records to typed attack capabilities, links them
//! into a dependency DAG, enumerates candidate chains from entry points to
//! attacker objectives, and scores and ranks them. The engine is a
//! synchronous, side-effect-free transformation: identical inputs and
//! registry always produce an identical `AnalysisResult`.

pub mod demo;
pub mod enumerate;
pub mod graph;
pub mod mapper;
pub mod report;
pub mod scoring;

pub use chainmap_core::error::Result;
pub use chainmap_core::{CapabilityRegistry, ChainmapError, EngineConfig};

use chainmap_core::types::{AnalysisResult, ScanDocument, Vulnerability};

use crate::graph::AttackGraph;

/// The attack-path analysis engine.
///
/// Holds the capability registry and configuration, both read-only after
/// construction. A single engine is safe to share across concurrent callers.
pub struct AnalysisEngine {
    registry: CapabilityRegistry,
    config: EngineConfig,
}

impl AnalysisEngine {
    /// Create an engine over a registry with default configuration.
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one scan's vulnerabilities into ranked attack chains.
    ///
    /// Composes mapper -> graph builder -> path enumerator -> ranker. Fails
    /// only on validation errors (duplicate ids, unknown types in strict
    /// mode); an empty graph or zero discovered paths is a valid result.
    pub fn analyze(&self, vulnerabilities: &[Vulnerability]) -> Result<AnalysisResult> {
        let (nodes, mut warnings) =
            mapper::map_vulnerabilities(vulnerabilities, &self.registry, self.config.strict_unknown_types)?;

        let (graph, edge_warnings) = AttackGraph::build(nodes, &self.registry);
        warnings.extend(edge_warnings);

        let entries = graph.entry_nodes();
        let objectives = graph.objective_nodes(&self.config.terminal_tactics);
        let (candidates, truncated) = enumerate::enumerate_candidates(
            &graph,
            &entries,
            &objectives,
            self.config.max_path_len,
            self.config.max_candidates_per_pair,
        );

        let paths = scoring::rank_candidates(
            &graph,
            &candidates,
            &self.config.scoring,
            self.config.top_k,
        );

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            candidates = candidates.len(),
            ranked = paths.len(),
            truncated,
            "analysis complete"
        );

        Ok(AnalysisResult {
            edges: graph.edges(),
            nodes: graph.nodes,
            paths,
            truncated,
            warnings,
        })
    }

    /// Analyze a full scan document.
    pub fn analyze_document(&self, document: &ScanDocument) -> Result<AnalysisResult> {
        tracing::info!(
            target = %document.target,
            scan_date = %document.scan_date,
            findings = document.vulnerabilities.len(),
            "analyzing scan"
        );
        self.analyze(&document.vulnerabilities)
    }
}
