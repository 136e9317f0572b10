pub mod daemon;
pub mod inventory;
pub mod jump;
pub mod output;
pub mod scan;

use anyhow::Result;
use colored::Colorize;

use crate::client::InfrascanClient;
use crate::config;

/// Client for the daemon named by `--url`, else the configured `client.url`.
pub fn connect(url: Option<&str>, config_path: Option<&str>) -> Result<InfrascanClient> {
    match url {
        Some(u) => InfrascanClient::new(u),
        None => {
            let cfg = config::load_optional(config_path)?;
            InfrascanClient::new(&cfg.client.url)
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} {} [y/N] ", "??".blue().bold(), prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
