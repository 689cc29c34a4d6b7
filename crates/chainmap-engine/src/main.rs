//! CLI entry point for the chainmap attack-chain analyzer.
//!
//! Reads a JSON scan document, runs the analysis engine, and emits either a
//! plain-text analyst report or the raw `AnalysisResult` JSON consumed by
//! the report/visualization collaborators.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use chainmap_core::types::ScanDocument;
use chainmap_core::{CapabilityRegistry, ChainmapError, EngineConfig};
use chainmap_engine::{demo, report, AnalysisEngine};

#[derive(Parser)]
#[command(name = "chainmap")]
#[command(about = "Converts scanned vulnerabilities into ranked attack chains")]
struct Cli {
    /// Scan results file (JSON). Required unless --demo is given.
    scan_file: Option<PathBuf>,

    /// Write a synthetic demo scan to sample_scan.json and exit.
    #[arg(long)]
    demo: bool,

    /// Number of ranked paths to report (overrides config).
    #[arg(long)]
    top_k: Option<usize>,

    /// Fail on vulnerability types missing from the registry instead of
    /// skipping them.
    #[arg(long)]
    strict: bool,

    /// Emit the analysis result as JSON instead of a text report.
    #[arg(long)]
    json: bool,

    /// Extend the builtin capability registry from a JSON table.
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Config file prefix (default: chainmap).
    #[arg(short, long, default_value = "chainmap")]
    config: String,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    if cli.demo {
        demo::write_sample_scan("sample_scan.json")?;
        eprintln!("Wrote demo scan to sample_scan.json");
        eprintln!("Now run: chainmap sample_scan.json");
        return Ok(());
    }

    let scan_file = cli
        .scan_file
        .as_ref()
        .context("a scan file is required (or pass --demo to generate one)")?;

    let mut config = load_engine_config(&cli.config);
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
    if cli.strict {
        config.strict_unknown_types = true;
    }

    let mut registry = CapabilityRegistry::builtin();
    if let Some(path) = &cli.registry {
        registry
            .merge_json_file(path)
            .with_context(|| format!("loading registry extension {}", path.display()))?;
        tracing::info!(entries = registry.len(), "registry extended");
    }

    let raw = std::fs::read_to_string(scan_file)
        .with_context(|| format!("reading scan file {}", scan_file.display()))?;
    let document: ScanDocument = serde_json::from_str(&raw)
        .map_err(|e| ChainmapError::InvalidInput(e.to_string()))
        .context("parsing scan document")?;

    let engine = AnalysisEngine::new(registry).with_config(config);
    let result = engine.analyze_document(&document)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::render_report(&document, &result));
    }

    Ok(())
}

fn load_engine_config(file_prefix: &str) -> EngineConfig {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("CHAINMAP")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    match cfg.and_then(|c| c.try_deserialize::<EngineConfig>()) {
        Ok(engine_config) => engine_config,
        Err(e) => {
            tracing::debug!(error = %e, "no usable config found, using defaults");
            EngineConfig::default()
        }
    }
}
