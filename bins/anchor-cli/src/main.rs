//! anchor-cli — Inspect and audit hard-coded chain checkpoints.
//!
//! Lists the active checkpoint table, prints the progress estimate, verifies
//! a single `(height, hash)` pair, and audits a headers file against both
//! the hash checkpoints and the sync-depth guard.

mod audit;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use anchor_core::constants::{NetworkType, CHECKPOINT_SPAN};
use anchor_core::types::Hash256;
use anchor_node_lib::{CheckpointService, LogFormat, NodeConfig};

/// Anchor checkpoint tool.
#[derive(Parser, Debug)]
#[command(
    name = "anchor-cli",
    version,
    about = "Inspect and audit hard-coded chain checkpoints"
)]
struct Cli {
    /// Config file (default: <config dir>/anchor/anchor.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the test network's checkpoint table
    #[arg(long, global = true)]
    testnet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every checkpoint in the active table.
    List,
    /// Print the chain length lower bound implied by the table.
    Estimate,
    /// Check one block hash against the table.
    Verify(VerifyArgs),
    /// Audit a JSON headers file.
    Audit(AuditArgs),
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Block height.
    #[arg(long)]
    height: u64,

    /// Block hash, 64 hex characters (optional 0x prefix).
    #[arg(long)]
    hash: String,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// JSON array of {"hash", "prev_hash"} records, genesis first.
    #[arg(long)]
    headers: PathBuf,
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    fn config(&self) -> Result<NodeConfig> {
        let mut config = NodeConfig::load(self.config.as_deref()).context("loading config")?;
        if self.testnet {
            config.network_type = NetworkType::Testnet;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.parse::<LogFormat>().map_err(|e| anyhow!(e))?;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    init_logging(&config.log_level, config.log_format);
    info!(network = %config.network_type, "anchor-cli starting");

    match cli.command {
        Commands::List => list(&config),
        Commands::Estimate => estimate(&config),
        Commands::Verify(args) => verify(&config, args),
        Commands::Audit(args) => run_audit(&config, args),
    }
}

fn list(config: &NodeConfig) -> Result<()> {
    let table = config.network_type.checkpoints();
    if table.is_empty() {
        println!("No checkpoints for {}", config.network_type);
        return Ok(());
    }
    println!("Checkpoints for {} ({}):", config.network_type, table.len());
    for (height, hash) in table {
        println!("  {height:>8}  {}", Hash256(*hash));
    }
    Ok(())
}

fn estimate(config: &NodeConfig) -> Result<()> {
    let checkpoints = anchor_consensus::Checkpoints::new(config.network_type);
    println!("{}", checkpoints.total_blocks_estimate());
    Ok(())
}

fn verify(config: &NodeConfig, args: VerifyArgs) -> Result<()> {
    let hash: Hash256 = args.hash.parse().context("invalid --hash")?;
    let checkpoints = anchor_consensus::Checkpoints::new(config.network_type);
    checkpoints.verify_hardened(args.height, &hash)?;
    match checkpoints.table().get(args.height) {
        Some(_) => println!("OK: height {} matches checkpoint", args.height),
        None => println!("OK: no checkpoint at height {}", args.height),
    }
    Ok(())
}

fn run_audit(config: &NodeConfig, args: AuditArgs) -> Result<()> {
    let records = audit::load_headers(&args.headers)?;
    let chain = audit::build_chain(&records)?;
    let service = CheckpointService::new(config, chain);
    let report = audit::audit(&service);

    println!("Blocks:           {}", report.blocks);
    println!("Best tip:         {} @ {}", report.tip.hash, report.tip.height);
    match report.last_checkpoint {
        Some(cp) => println!("Last checkpoint:  {} @ {}", cp.hash, cp.height),
        None => println!("Last checkpoint:  none known"),
    }
    println!(
        "Sync checkpoint:  {} @ {} (span {CHECKPOINT_SPAN})",
        report.sync_checkpoint.hash, report.sync_checkpoint.height
    );
    println!(
        "Reorgs allowed above height {}",
        report.sync_checkpoint.height
    );

    if report.mismatches.is_empty() {
        println!("Checkpoint mismatches: none");
        return Ok(());
    }
    println!("Checkpoint mismatches: {}", report.mismatches.len());
    for err in &report.mismatches {
        println!("  {err}");
    }
    bail!(
        "{} block(s) conflict with the {} checkpoint table",
        report.mismatches.len(),
        config.network_type
    )
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// `RUST_LOG` takes precedence over `level_str`. Logs go to stderr so command
/// output on stdout stays clean.
fn init_logging(level_str: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
