//! Seed inventory loaded at daemon start.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

use super::types::*;

/// The two demo servers every fresh dashboard starts with.
pub fn demo_servers(now: DateTime<Utc>) -> Vec<ServerRecord> {
    vec![
        ServerRecord {
            id: "1".to_string(),
            hostname: "hft-primary-01".to_string(),
            management_ip: "10.20.1.5".to_string(),
            manufacturer: "Dell".to_string(),
            model: "PowerEdge R750".to_string(),
            cpu_vendor: CpuVendor::Intel,
            cpu_model: "Intel(R) Xeon(R) Platinum 8368 CPU @ 2.40GHz".to_string(),
            sockets: 2,
            core_count: 76,
            ram_gb: 512,
            interfaces: vec![
                iface("eno1", "10.20.1.5", InterfaceSpeed::Gbps1, InterfaceKind::Management),
                iface(
                    "enp101s0",
                    "192.168.100.10",
                    InterfaceSpeed::Gbps25,
                    InterfaceKind::ExaNic,
                ),
            ],
            last_scanned: now,
            status: ServerStatus::Online,
            notes: None,
        },
        ServerRecord {
            id: "2".to_string(),
            hostname: "hft-backup-02".to_string(),
            management_ip: "10.20.1.6".to_string(),
            manufacturer: "Supermicro".to_string(),
            model: "AS -2023US".to_string(),
            cpu_vendor: CpuVendor::Amd,
            cpu_model: "AMD EPYC 7763 64-Core Processor".to_string(),
            sockets: 2,
            core_count: 128,
            ram_gb: 1024,
            interfaces: vec![
                iface("eth0", "10.20.1.6", InterfaceSpeed::Gbps1, InterfaceKind::Management),
                iface(
                    "eth2",
                    "192.168.100.11",
                    InterfaceSpeed::Gbps10,
                    InterfaceKind::Solarflare,
                ),
            ],
            last_scanned: now - Duration::days(1),
            status: ServerStatus::Online,
            notes: None,
        },
    ]
}

fn iface(name: &str, ip: &str, speed: InterfaceSpeed, kind: InterfaceKind) -> NetworkInterface {
    NetworkInterface {
        name: name.to_string(),
        ip: ip.to_string(),
        speed,
        kind,
    }
}

/// Read a YAML list of server records.
pub fn load_file(path: &Path) -> Result<Vec<ServerRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("parsing seed file {}", path.display()))
}
