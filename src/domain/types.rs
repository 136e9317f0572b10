//! Inventory records: the hardware description of a single server.
//!
//! Field names serialize in camelCase so that records, extraction results and
//! exports line up with the JSON shape the extraction service is asked for.

use async_graphql::{Enum, InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cores assumed per physical socket when estimating `core_count`.
pub const CORES_PER_SOCKET_ESTIMATE: u32 = 32;

/// Management IP used when neither the operator nor the extraction named one.
pub const FALLBACK_MANAGEMENT_IP: &str = "0.0.0.0";

const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ── Server ─────────────────────────────────────────────────

/// A server in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub id: String,
    pub hostname: String,
    pub management_ip: String,
    pub manufacturer: String,
    pub model: String,
    #[serde(rename = "cpuManufacturer")]
    #[graphql(name = "cpuManufacturer")]
    pub cpu_vendor: CpuVendor,
    pub cpu_model: String,
    /// Physical sockets.
    #[serde(rename = "cpuCount")]
    #[graphql(name = "cpuCount")]
    pub sockets: u32,
    /// Total cores (estimated from sockets for scanned servers).
    pub core_count: u32,
    pub ram_gb: u32,
    #[serde(default)]
    pub interfaces: Vec<NetworkInterface>,
    pub last_scanned: DateTime<Utc>,
    pub status: ServerStatus,
    /// Free-form operator notes. Scans never set this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ServerRecord {
    /// Deterministic core estimate used for every scanned server.
    pub fn estimated_cores(sockets: u32) -> u32 {
        sockets.saturating_mul(CORES_PER_SOCKET_ESTIMATE)
    }

    /// Build the record committed at the end of a scan.
    pub fn from_extraction(
        result: ExtractionResult,
        management_ip: String,
        id: String,
        hostname: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            hostname,
            management_ip,
            cpu_vendor: CpuVendor::from_model(&result.cpu_model),
            core_count: Self::estimated_cores(result.sockets),
            manufacturer: result.manufacturer,
            model: result.model,
            cpu_model: result.cpu_model,
            sockets: result.sockets,
            ram_gb: result.ram_gb,
            interfaces: result.interfaces,
            last_scanned: now,
            status: ServerStatus::Online,
            notes: None,
        }
    }

    /// Lower-cased text the multi-term search matches against.
    pub fn searchable_text(&self) -> String {
        let mut parts = vec![
            self.hostname.clone(),
            self.management_ip.clone(),
            self.manufacturer.clone(),
            self.model.clone(),
            self.cpu_vendor.to_string(),
            self.cpu_model.clone(),
        ];
        parts.extend(self.interfaces.iter().map(|i| {
            format!("{} {} {} {}", i.name, i.ip, i.kind, i.speed)
        }));
        parts.extend(self.notes.clone());
        parts.join(" ").to_lowercase()
    }
}

/// Random opaque identifier (lowercase base-36).
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Hostname for a freshly scanned server: `server-<manufacturer>-<n>`.
pub fn generate_hostname(manufacturer: &str) -> String {
    let vendor: String = manufacturer
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("server-{}-{}", vendor, rand::rng().random_range(0..100))
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Enum,
)]
pub enum ServerStatus {
    #[default]
    Online,
    Offline,
    Maintenance,
    Scanning,
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerStatus::Online => write!(f, "Online"),
            ServerStatus::Offline => write!(f, "Offline"),
            ServerStatus::Maintenance => write!(f, "Maintenance"),
            ServerStatus::Scanning => write!(f, "Scanning"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Enum,
)]
pub enum CpuVendor {
    Intel,
    #[serde(rename = "AMD")]
    #[graphql(name = "AMD")]
    Amd,
    #[default]
    Unknown,
}

impl CpuVendor {
    /// Classify a CPU model string by vendor keywords.
    pub fn from_model(cpu_model: &str) -> Self {
        let model = cpu_model.to_lowercase();
        if ["amd", "epyc", "ryzen"].iter().any(|k| model.contains(k)) {
            CpuVendor::Amd
        } else if ["intel", "xeon"].iter().any(|k| model.contains(k)) {
            CpuVendor::Intel
        } else {
            CpuVendor::Unknown
        }
    }
}

impl std::fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CpuVendor::Intel => write!(f, "Intel"),
            CpuVendor::Amd => write!(f, "AMD"),
            CpuVendor::Unknown => write!(f, "Unknown"),
        }
    }
}

// ── Network ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct NetworkInterface {
    pub name: String,
    pub ip: String,
    pub speed: InterfaceSpeed,
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    pub kind: InterfaceKind,
}

/// Link speed tier. Unrecognised values deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(from = "String")]
pub enum InterfaceSpeed {
    #[serde(rename = "1G")]
    Gbps1,
    #[serde(rename = "10G")]
    Gbps10,
    #[serde(rename = "25G")]
    Gbps25,
    #[serde(rename = "40G")]
    Gbps40,
    #[serde(rename = "100G")]
    Gbps100,
    Unknown,
}

impl From<String> for InterfaceSpeed {
    fn from(s: String) -> Self {
        match s.trim().to_uppercase().as_str() {
            "1G" => InterfaceSpeed::Gbps1,
            "10G" => InterfaceSpeed::Gbps10,
            "25G" => InterfaceSpeed::Gbps25,
            "40G" => InterfaceSpeed::Gbps40,
            "100G" => InterfaceSpeed::Gbps100,
            _ => InterfaceSpeed::Unknown,
        }
    }
}

impl std::fmt::Display for InterfaceSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InterfaceSpeed::Gbps1 => "1G",
            InterfaceSpeed::Gbps10 => "10G",
            InterfaceSpeed::Gbps25 => "25G",
            InterfaceSpeed::Gbps40 => "40G",
            InterfaceSpeed::Gbps100 => "100G",
            InterfaceSpeed::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Role of a network interface. Unrecognised values deserialize as `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(from = "String")]
pub enum InterfaceKind {
    Management,
    Data,
    #[serde(rename = "ExaNIC")]
    #[graphql(name = "EXANIC")]
    ExaNic,
    Solarflare,
    Standard,
}

impl From<String> for InterfaceKind {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "management" => InterfaceKind::Management,
            "data" => InterfaceKind::Data,
            "exanic" => InterfaceKind::ExaNic,
            "solarflare" => InterfaceKind::Solarflare,
            _ => InterfaceKind::Standard,
        }
    }
}

impl std::fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InterfaceKind::Management => "Management",
            InterfaceKind::Data => "Data",
            InterfaceKind::ExaNic => "ExaNIC",
            InterfaceKind::Solarflare => "Solarflare",
            InterfaceKind::Standard => "Standard",
        };
        f.write_str(s)
    }
}

// ── Extraction ─────────────────────────────────────────────

/// Normalized output of a log extraction, awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub manufacturer: String,
    pub model: String,
    pub cpu_model: String,
    #[serde(rename = "cpuCount")]
    #[graphql(name = "cpuCount")]
    pub sockets: u32,
    pub ram_gb: u32,
    pub interfaces: Vec<NetworkInterface>,
}

impl ExtractionResult {
    pub fn management_interface_ip(&self) -> Option<&str> {
        self.interfaces
            .iter()
            .find(|i| i.kind == InterfaceKind::Management)
            .map(|i| i.ip.as_str())
    }
}

// ── Jump host ──────────────────────────────────────────────

pub const DEFAULT_JUMP_HOSTNAME: &str = "jump.infra.local";
pub const DEFAULT_JUMP_USERNAME: &str = "admin";
pub const DEFAULT_JUMP_PORT: u16 = 22;
pub const DEFAULT_KEY_NAME: &str = "id_rsa";

/// Bastion host the simulated session hops through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject, InputObject)]
#[serde(rename_all = "camelCase")]
#[graphql(input_name = "JumpServerConfigInput")]
pub struct JumpServerConfig {
    pub hostname: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, rename = "authType")]
    #[graphql(name = "authType")]
    pub auth_method: AuthMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_content: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_JUMP_PORT
}

impl Default for JumpServerConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_JUMP_HOSTNAME.to_string(),
            username: DEFAULT_JUMP_USERNAME.to_string(),
            password: None,
            port: DEFAULT_JUMP_PORT,
            auth_method: AuthMethod::Password,
            key_name: None,
            key_content: None,
        }
    }
}

impl JumpServerConfig {
    /// Key filename shown in key-based banners.
    pub fn key_name_or_default(&self) -> &str {
        self.key_name
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_KEY_NAME)
    }

    /// Copy with credential material masked.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "********".to_string());
        Self {
            password: mask(&self.password),
            key_content: mask(&self.key_content),
            ..self.clone()
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Enum,
)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    #[default]
    Password,
    Key,
}

impl std::str::FromStr for AuthMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "password" => Ok(AuthMethod::Password),
            "key" => Ok(AuthMethod::Key),
            other => anyhow::bail!("unknown auth type '{}': expected password or key", other),
        }
    }
}
