//! `infrascan scan`: run one scan session in-process and commit the result
//! to the daemon.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tokio::sync::broadcast;

use super::output;
use crate::client::InfrascanClient;
use crate::config::{self, Config};
use crate::domain::inventory::InventoryStore;
use crate::domain::types::{ExtractionResult, JumpServerConfig};
use crate::extraction::{GeminiExtractor, VendorPreference};
use crate::logging;
use crate::scan::script::{ERROR_BANNER, PARSING_BANNER};
use crate::scan::{ScanWorkflow, SystemClock};

#[derive(Args)]
pub struct ScanArgs {
    /// Target management IP (automated scan)
    #[arg(long)]
    pub target: Option<String>,

    /// Parse an existing log file instead of scanning
    #[arg(long, conflicts_with = "stdin")]
    pub log_file: Option<PathBuf>,

    /// Read the log to parse from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Vendor for the synthetic log: random, intel or amd (overrides config)
    #[arg(long)]
    pub vendor: Option<VendorPreference>,

    /// Emit banners without pauses
    #[arg(long)]
    pub no_pacing: bool,

    /// Commit without asking
    #[arg(long)]
    pub yes: bool,

    /// Print the record as JSON instead of sending it to the daemon
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &ScanArgs, url: Option<&str>, config_path: Option<&str>) -> Result<()> {
    let mut cfg = config::load_optional(config_path)?;
    if args.no_pacing {
        cfg.scan.pacing = false;
    }
    if let Some(vendor) = args.vendor {
        cfg.scan.vendor_hint = vendor;
    }
    logging::init_cli("warn");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(args, url, cfg))
}

async fn run_async(args: &ScanArgs, url: Option<&str>, cfg: Config) -> Result<()> {
    if args.stdin && !args.yes {
        bail!("--stdin needs --yes, the confirmation prompt cannot share stdin with the log");
    }
    let pasted = read_pasted_log(args)?;
    if args.target.is_none() && pasted.is_none() {
        bail!("nothing to scan: pass --target <ip>, --log-file <path> or --stdin");
    }

    let client = InfrascanClient::new(url.unwrap_or(&cfg.client.url))?;
    let jump = resolve_jump_host(&client, &cfg, args.dry_run).await;

    let extractor = Arc::new(GeminiExtractor::new(&cfg.extraction)?);
    let workflow = ScanWorkflow::new(
        extractor,
        Arc::new(SystemClock),
        cfg.scan.pacing,
        cfg.scan.vendor_hint,
    );
    workflow.open().await;

    if let Some(text) = &pasted {
        workflow.set_manual_log(text).await?;
    }

    let outcome = match &args.target {
        Some(ip) => {
            workflow.set_target_ip(ip).await?;
            println!(
                "{} Scanning {} via {}@{}",
                ">>".blue().bold(),
                ip.bold(),
                jump.username,
                jump.hostname
            );
            stream_transcript(&workflow, &jump).await
        }
        None => {
            println!("{} Parsing pasted log", ">>".blue().bold());
            workflow.parse_manual().await
        }
    };

    let result = outcome.context("scan failed")?;

    print_review(&result);

    if !args.yes && !super::confirm("Commit to inventory?")? {
        workflow.discard().await?;
        println!("{} Discarded", "::".blue().bold());
        return Ok(());
    }

    let mut staged = InventoryStore::new();
    let record = workflow.commit(&mut staged).await?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let saved = client
        .add_server(&record)
        .await
        .context("sending record to the daemon")?;
    println!(
        "{} Added {} ({}) as {}",
        "ok".green().bold(),
        saved.hostname.bold(),
        saved.management_ip,
        saved.id
    );
    Ok(())
}

fn read_pasted_log(args: &ScanArgs) -> Result<Option<String>> {
    let text = if let Some(path) = &args.log_file {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading log file {}", path.display()))?
    } else if args.stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading log from stdin")?;
        buf
    } else {
        return Ok(None);
    };

    if text.trim().is_empty() {
        bail!("the pasted log is empty");
    }
    Ok(Some(text))
}

/// Daemon's jump host when reachable, else the configured one, else defaults.
async fn resolve_jump_host(client: &InfrascanClient, cfg: &Config, offline: bool) -> JumpServerConfig {
    if !offline {
        match client.jump_host().await {
            Ok(jump) => return jump,
            Err(e) => {
                tracing::warn!(error = %e, "daemon unreachable, using configured jump host");
            }
        }
    }
    cfg.jump_host.clone().unwrap_or_default()
}

/// Run the automated scan, printing each transcript line as it arrives.
async fn stream_transcript(
    workflow: &ScanWorkflow,
    jump: &JumpServerConfig,
) -> Result<ExtractionResult, crate::scan::ScanError> {
    let mut lines = workflow.subscribe();
    let mut open = true;
    let scan = workflow.start_scan(jump);
    tokio::pin!(scan);

    let result = loop {
        tokio::select! {
            biased;
            line = lines.recv(), if open => match line {
                Ok(line) => print_line(&line),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "transcript output fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => open = false,
            },
            result = &mut scan => break result,
        }
    };

    while let Ok(line) = lines.try_recv() {
        print_line(&line);
    }
    result
}

fn print_line(line: &str) {
    if line == ERROR_BANNER {
        println!("{}", line.red());
    } else if line == PARSING_BANNER {
        println!("{}", line.yellow());
    } else {
        println!("{}", line.dimmed());
    }
}

fn print_review(result: &ExtractionResult) {
    println!();
    println!("{}", "Scan review".bold());
    output::print_fields(&output::review_fields(result));
    println!();
}
