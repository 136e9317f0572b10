//! `infrascan jump show|set`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;

use super::output::{is_json, print_output};
use crate::client::InfrascanClient;
use crate::domain::types::{AuthMethod, JumpServerConfig, DEFAULT_JUMP_PORT};

#[derive(Subcommand)]
pub enum JumpCommands {
    /// Show the effective jump host (credentials masked)
    Show,
    /// Replace the jump host configuration
    Set {
        #[arg(long)]
        hostname: String,

        #[arg(long)]
        username: String,

        #[arg(long, default_value_t = DEFAULT_JUMP_PORT)]
        port: u16,

        /// password or key
        #[arg(long, default_value = "password")]
        auth: AuthMethod,

        #[arg(long)]
        password: Option<String>,

        /// Private key file; its contents are sent to the daemon
        #[arg(long)]
        key_file: Option<PathBuf>,
    },
}

pub fn run(client: &InfrascanClient, format: &str, command: &JumpCommands) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(client, format, command))
}

async fn run_async(client: &InfrascanClient, format: &str, command: &JumpCommands) -> Result<()> {
    match command {
        JumpCommands::Show => {
            let jump = client.jump_host().await?;
            if is_json(format) {
                return print_output(format, &jump);
            }
            let saved = client.health().await?.jump_host_configured;
            print_jump(&jump, saved);
            Ok(())
        }
        JumpCommands::Set {
            hostname,
            username,
            port,
            auth,
            password,
            key_file,
        } => {
            let config = build_config(hostname, username, *port, *auth, password.clone(), key_file.as_ref())?;
            let saved = client.save_jump_host(&config).await?;
            println!(
                "{} Jump host set to {}@{}:{}",
                "ok".green().bold(),
                saved.username,
                saved.hostname.bold(),
                saved.port
            );
            Ok(())
        }
    }
}

fn build_config(
    hostname: &str,
    username: &str,
    port: u16,
    auth: AuthMethod,
    password: Option<String>,
    key_file: Option<&PathBuf>,
) -> Result<JumpServerConfig> {
    let (key_name, key_content) = match key_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading key file {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            (name, Some(content))
        }
        None => (None, None),
    };

    if auth == AuthMethod::Key && key_content.is_none() {
        bail!("--auth key requires --key-file");
    }

    Ok(JumpServerConfig {
        hostname: hostname.to_string(),
        username: username.to_string(),
        password,
        port,
        auth_method: auth,
        key_name,
        key_content,
    })
}

fn print_jump(jump: &JumpServerConfig, saved: bool) {
    if saved {
        println!("{}", "Jump host".bold());
    } else {
        println!("{} {}", "Jump host".bold(), "(defaults, nothing saved)".dimmed());
    }
    println!("  host:     {}@{}:{}", jump.username, jump.hostname, jump.port);
    match jump.auth_method {
        AuthMethod::Password => {
            let state = if jump.password.is_some() { "set" } else { "not set" };
            println!("  auth:     password ({})", state.dimmed());
        }
        AuthMethod::Key => {
            println!("  auth:     key {}", jump.key_name_or_default().dimmed());
        }
    }
}
