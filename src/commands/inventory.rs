//! `infrascan status|servers|server|remove|history|export` against a running daemon.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::output::{self, is_json, print_output};
use crate::client::InfrascanClient;

#[derive(Subcommand)]
pub enum InventoryCommands {
    /// Daemon health and inventory size
    Status,
    /// List servers, optionally filtered by search terms
    Servers {
        /// Space-separated terms; every term must match
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one server in detail
    Server {
        /// Server id
        id: String,
    },
    /// Remove a server from the inventory
    Remove {
        /// Server id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show recent searches
    History {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },
    /// Download the inventory as CSV
    Export {
        /// Destination file (default: the name the daemon suggests)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub fn run(client: &InfrascanClient, format: &str, command: &InventoryCommands) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(client, format, command))
}

async fn run_async(client: &InfrascanClient, format: &str, command: &InventoryCommands) -> Result<()> {
    match command {
        InventoryCommands::Status => {
            let health = client.health().await?;
            if is_json(format) {
                return print_output(format, &health);
            }
            println!("{}", "infrascan status".bold());
            println!("  daemon:    {} (v{})", "reachable".green(), health.version);
            println!("  servers:   {}", health.servers);
            let jump = if health.jump_host_configured {
                "configured".green()
            } else {
                "defaults".yellow()
            };
            println!("  jump host: {}", jump);
            Ok(())
        }
        InventoryCommands::Servers { search } => {
            let query = search.as_deref().unwrap_or("");
            let servers = client.servers(query, !query.trim().is_empty()).await?;
            if is_json(format) {
                return print_output(format, &servers);
            }
            if servers.is_empty() {
                println!("{} No servers match '{}'", "::".blue().bold(), query);
                return Ok(());
            }
            for row in output::server_table(&servers) {
                println!("{}", row);
            }
            Ok(())
        }
        InventoryCommands::Server { id } => {
            let server = client.server(id).await?;
            if is_json(format) {
                return print_output(format, &server);
            }
            println!("{}", server.hostname.bold());
            output::print_fields(&output::server_detail(&server));
            Ok(())
        }
        InventoryCommands::Remove { id, yes } => {
            let server = client.server(id).await?;
            if !yes {
                let prompt = format!(
                    "Remove {} ({}) from the inventory?",
                    server.hostname, server.management_ip
                );
                if !super::confirm(&prompt)? {
                    println!("{} Kept {}", "::".blue().bold(), server.hostname);
                    return Ok(());
                }
            }
            let removed = client.remove_server(id).await?;
            println!("{} Removed {}", "ok".green().bold(), removed.hostname.bold());
            Ok(())
        }
        InventoryCommands::History { clear } => {
            if *clear {
                client.clear_history().await?;
                println!("{} Search history cleared", "ok".green().bold());
                return Ok(());
            }
            let entries = client.history().await?;
            if is_json(format) {
                return print_output(format, &entries);
            }
            if entries.is_empty() {
                println!("{} No recent searches", "::".blue().bold());
            }
            for entry in entries {
                println!("  {}", entry);
            }
            Ok(())
        }
        InventoryCommands::Export { output } => {
            let export = client.export().await?;
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&export.filename));
            std::fs::write(&path, &export.csv)?;
            let rows = export.csv.lines().count().saturating_sub(1);
            println!(
                "{} Exported {} servers to {}",
                "ok".green().bold(),
                rows,
                path.display()
            );
            Ok(())
        }
    }
}
