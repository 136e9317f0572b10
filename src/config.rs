use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::types::JumpServerConfig;
use crate::extraction::VendorPreference;

const ENV_PREFIX: &str = "INFRASCAN_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub daemon: DaemonConfig,
    pub client: ClientConfig,
    pub extraction: ExtractionConfig,
    pub scan: ScanConfig,
    pub inventory: InventoryConfig,
    /// Jump host the daemon starts with; unset means the built-in defaults.
    pub jump_host: Option<JumpServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub http_addr: String,
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:9200".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the daemon the CLI commands talk to.
    pub url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9200".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Unset: calls may hang indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl ExtractionConfig {
    /// Configured key, else `GEMINI_API_KEY`, else `API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Pause between banner lines. Off: banners are emitted back to back.
    pub pacing: bool,
    pub vendor_hint: VendorPreference,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pacing: true,
            vendor_hint: VendorPreference::Random,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub seed_demo: bool,
    pub seed_file: Option<PathBuf>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            seed_demo: true,
            seed_file: None,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("infrascan").join("config.yaml"))
    }
}

/// Defaults → `~/.config/infrascan/config.yaml` → `INFRASCAN_*` env.
pub fn load() -> Result<Config> {
    load_from(&Config::path()?)
}

/// Same layering with an explicit file. A missing file contributes nothing.
pub fn load_from(path: &Path) -> Result<Config> {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .with_context(|| format!("loading configuration from {}", path.display()))
}

/// `--config` flag if given, otherwise the default location.
pub fn load_optional(path: Option<&str>) -> Result<Config> {
    match path {
        Some(p) => load_from(Path::new(p)),
        None => load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AuthMethod;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let cfg = load_from(Path::new("/nonexistent/infrascan.yaml")).unwrap();
        assert_eq!(cfg.daemon.http_addr, "127.0.0.1:9200");
        assert_eq!(cfg.extraction.model, "gemini-2.5-flash");
        assert!(cfg.extraction.request_timeout_secs.is_none());
        assert!(cfg.scan.pacing);
        assert!(cfg.inventory.seed_demo);
        assert!(cfg.jump_host.is_none());
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
daemon:
  http_addr: 0.0.0.0:9300
scan:
  pacing: false
  vendor_hint: amd
inventory:
  seed_demo: false
jump_host:
  hostname: bastion.dc2
  username: ops
  authType: key
  keyName: ops_ed25519
"#
        )
        .unwrap();

        let cfg = load_from(file.path()).unwrap();
        assert_eq!(cfg.daemon.http_addr, "0.0.0.0:9300");
        assert_eq!(cfg.daemon.log_level, "info");
        assert!(!cfg.scan.pacing);
        assert_eq!(cfg.scan.vendor_hint, VendorPreference::Amd);
        assert!(!cfg.inventory.seed_demo);

        let jump = cfg.jump_host.unwrap();
        assert_eq!(jump.hostname, "bastion.dc2");
        assert_eq!(jump.port, 22);
        assert_eq!(jump.auth_method, AuthMethod::Key);
        assert_eq!(jump.key_name_or_default(), "ops_ed25519");
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let cfg = ExtractionConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_api_key().as_deref(), Some("from-config"));
    }
}
