//! Tabular CSV export of the whole inventory.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, SecondsFormat};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::types::ServerRecord;

const HEADERS: [&str; 13] = [
    "ID",
    "Hostname",
    "Management IP",
    "Manufacturer",
    "Model",
    "CPU Manufacturer",
    "CPU Model",
    "Sockets",
    "Cores",
    "RAM (GB)",
    "Interfaces",
    "Status",
    "Last Scanned",
];

/// Bare header row, then one fully-quoted row per record, newline-joined
/// with no trailing newline.
pub fn to_csv(records: &[ServerRecord]) -> Result<String> {
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(HEADERS)?;
    let buf = header
        .into_inner()
        .map_err(|e| anyhow!("CSV writer error: {}", e))?;

    let mut rows = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);
    for record in records {
        rows.write_record(row(record))?;
    }
    let data = rows
        .into_inner()
        .map_err(|e| anyhow!("CSV writer error: {}", e))?;

    let mut out = String::from_utf8(data)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// `inventory_export_YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("inventory_export_{}.csv", date.format("%Y-%m-%d"))
}

fn row(r: &ServerRecord) -> [String; 13] {
    let interfaces = r
        .interfaces
        .iter()
        .map(|i| format!("{}({})", i.name, i.ip))
        .collect::<Vec<_>>()
        .join(";");

    [
        r.id.clone(),
        r.hostname.clone(),
        r.management_ip.clone(),
        r.manufacturer.clone(),
        r.model.clone(),
        r.cpu_vendor.to_string(),
        r.cpu_model.clone(),
        r.sockets.to_string(),
        r.core_count.to_string(),
        r.ram_gb.to_string(),
        interfaces,
        r.status.to_string(),
        r.last_scanned.to_rfc3339_opts(SecondsFormat::Millis, true),
    ]
}
