//! Terminal rendering shared by the client commands.
//!
//! `--format json` prints the daemon's JSON as-is; anything else renders a
//! human view built from plain strings so the layout can be tested.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::domain::types::{ExtractionResult, NetworkInterface, ServerRecord};

pub fn is_json(format: &str) -> bool {
    format == "json"
}

/// JSON, or a recursive key/value listing of the serialized value.
pub fn print_output<T: Serialize>(format: &str, data: &T) -> Result<()> {
    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        let mut lines = Vec::new();
        render_value(&serde_json::to_value(data)?, 0, &mut lines);
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(())
}

fn render_value(value: &Value, indent: usize, out: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) => {
                        out.push(format!("{}{}:", pad, key));
                        render_value(val, indent + 1, out);
                    }
                    Value::Array(arr) if arr.iter().any(|v| v.is_object() || v.is_array()) => {
                        out.push(format!("{}{}:", pad, key));
                        render_value(val, indent + 1, out);
                    }
                    Value::Array(arr) => {
                        let items: Vec<String> = arr.iter().map(scalar).collect();
                        out.push(format!("{}{}: [{}]", pad, key, items.join(", ")));
                    }
                    _ => out.push(format!("{}{}: {}", pad, key, scalar(val))),
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                if item.is_object() {
                    out.push(format!("{}[{}]:", pad, i));
                    render_value(item, indent + 1, out);
                } else {
                    out.push(format!("{}- {}", pad, scalar(item)));
                }
            }
        }
        _ => out.push(format!("{}{}", pad, scalar(value))),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Inventory views ────────────────────────────────────────

const TABLE_HEADER: &str = "ID         HOSTNAME              MGMT IP          VENDOR   SOCK  CORES    RAM  STATUS";

/// Fixed-width listing, one row per server.
pub fn server_table(records: &[ServerRecord]) -> Vec<String> {
    let mut rows = vec![TABLE_HEADER.to_string()];
    rows.extend(records.iter().map(|r| {
        format!(
            "{:<10} {:<21} {:<16} {:<8} {:>4} {:>6} {:>4}GB  {}",
            r.id,
            r.hostname,
            r.management_ip,
            r.cpu_vendor.to_string(),
            r.sockets,
            r.core_count,
            r.ram_gb,
            r.status
        )
    }));
    rows
}

pub fn server_detail(record: &ServerRecord) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("id", record.id.clone()),
        ("hostname", record.hostname.clone()),
        ("management ip", record.management_ip.clone()),
        ("manufacturer", record.manufacturer.clone()),
        ("model", record.model.clone()),
        ("cpu", format!("{} ({})", record.cpu_model, record.cpu_vendor)),
        ("sockets", record.sockets.to_string()),
        (
            "cores",
            format!("{} (est.)", ServerRecord::estimated_cores(record.sockets)),
        ),
        ("ram", format!("{} GB", record.ram_gb)),
        ("status", record.status.to_string()),
        ("last scanned", record.last_scanned.to_rfc3339()),
    ];
    fields.extend(record.interfaces.iter().map(|i| ("interface", interface_line(i))));
    if let Some(notes) = &record.notes {
        fields.push(("notes", notes.clone()));
    }
    fields
}

/// What a scan found, before it is committed.
pub fn review_fields(result: &ExtractionResult) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("manufacturer", result.manufacturer.clone()),
        ("model", result.model.clone()),
        ("cpu", result.cpu_model.clone()),
        ("sockets", result.sockets.to_string()),
        (
            "cores",
            format!("{} (est.)", ServerRecord::estimated_cores(result.sockets)),
        ),
        ("ram", format!("{} GB", result.ram_gb)),
    ];
    fields.extend(result.interfaces.iter().map(|i| ("interface", interface_line(i))));
    fields
}

fn interface_line(iface: &NetworkInterface) -> String {
    format!("{} {} {} {}", iface.name, iface.ip, iface.speed, iface.kind)
}

pub fn print_fields(fields: &[(&str, String)]) {
    for (label, value) in fields {
        println!("  {:<14} {}", format!("{}:", label), value);
    }
}
