mod api;
mod client;
mod commands;
mod config;
mod domain;
mod extraction;
mod logging;
mod scan;
mod server;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "infrascan",
    version,
    about = "Bare-metal hardware inventory with LLM-assisted log extraction"
)]
struct Cli {
    /// Path to config file (default: ~/.config/infrascan/config.yaml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Daemon base URL (overrides client.url)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Output format (table or json)
    #[arg(long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the infrascan daemon (REST + GraphQL)
    Serve {
        /// HTTP listen address (overrides config)
        #[arg(long)]
        http_addr: Option<String>,

        /// Log level (overrides config)
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Scan a server through the jump host, or parse a pasted log
    Scan(commands::scan::ScanArgs),

    #[command(flatten)]
    Inventory(commands::inventory::InventoryCommands),

    /// Show or change the jump host
    Jump {
        #[command(subcommand)]
        command: commands::jump::JumpCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let url = cli.url.as_deref();

    match cli.command {
        Commands::Serve {
            http_addr,
            log_level,
        } => commands::daemon::run(http_addr, log_level, config),
        Commands::Scan(args) => commands::scan::run(&args, url, config),
        Commands::Inventory(command) => {
            let client = commands::connect(url, config)?;
            commands::inventory::run(&client, &cli.format, &command)
        }
        Commands::Jump { command } => {
            let client = commands::connect(url, config)?;
            commands::jump::run(&client, &cli.format, &command)
        }
    }
}
