//! Google Generative Language API client.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{decode_extraction, ExtractionError, LogExtractor, VendorHint};
use crate::config::ExtractionConfig;
use crate::domain::types::ExtractionResult;

pub struct GeminiExtractor {
    base_url: String,
    model: String,
    api_key: Option<String>,
    http: Client,
}

impl GeminiExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("building extraction HTTP client")?;

        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!("no extraction API key configured; scans will fail until one is set");
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            http,
        })
    }

    async fn generate(&self, body: &Value) -> Result<String> {
        let Some(key) = self.api_key.as_deref() else {
            bail!("extraction API key not configured");
        };
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        if !resp.status().is_success() {
            bail!("{} returned {}", url, resp.status());
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .with_context(|| format!("parsing response from {}", url))?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl LogExtractor for GeminiExtractor {
    async fn generate_synthetic_log(&self, hint: VendorHint) -> Result<String, ExtractionError> {
        let body = synthetic_log_request(hint);
        let text = self.generate(&body).await.map_err(|e| {
            warn!(error = %e, "synthetic log generation failed");
            ExtractionError::Unavailable(format!("{:#}", e))
        })?;

        if text.trim().is_empty() {
            return Err(ExtractionError::Unavailable("empty response".to_string()));
        }
        debug!(bytes = text.len(), ?hint, "generated synthetic log");
        Ok(text)
    }

    async fn parse_log(&self, raw: &str) -> Result<ExtractionResult, ExtractionError> {
        let body = parse_request(raw);
        let text = self.generate(&body).await.map_err(|e| {
            warn!(error = %e, "log extraction request failed");
            ExtractionError::ParseFailure(format!("{:#}", e))
        })?;
        decode_extraction(&text)
    }
}

// ── Request bodies ─────────────────────────────────────────

fn synthetic_log_request(hint: VendorHint) -> Value {
    let prompt = format!(
        "Generate a realistic, raw text output that looks like a combination of Linux commands:\n\
         'dmidecode -t system', 'lscpu', and 'ip addr'.\n\n\
         The server should be a high-frequency trading server.\n\n\
         Requirements:\n\
         - Manufacturer: Dell, HP, or Supermicro.\n\
         - CPU: {}. Dual Socket.\n\
         - RAM: High amount (e.g., 512GB or 1TB).\n\
         - Network: Include a standard 1G management interface, and at least one \
         high-performance card (ExaNIC or Solarflare) with 10G or 25G IPs.\n\n\
         Output ONLY the raw text log, nothing else.",
        hint.cpu_family()
    );

    json!({ "contents": [{ "parts": [{ "text": prompt }] }] })
}

fn parse_request(raw: &str) -> Value {
    let prompt = format!(
        "Analyze the following raw server logs (which may contain output from lscpu, \
         dmidecode, ip addr, etc.).\n\
         Extract the hardware inventory details.\n\n\
         Raw Logs:\n{}",
        raw
    );

    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": extraction_schema(),
        }
    })
}

fn extraction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "manufacturer": { "type": "STRING", "description": "Server OEM (e.g., Dell, HP)" },
            "model": { "type": "STRING", "description": "Server Model Name" },
            "cpuModel": { "type": "STRING", "description": "Full CPU Model Name" },
            "cpuCount": { "type": "INTEGER", "description": "Number of physical CPUs (sockets)" },
            "ramGb": { "type": "INTEGER", "description": "Total RAM in GB" },
            "interfaces": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Interface name (eth0, p1p1)" },
                        "ip": { "type": "STRING", "description": "IP Address (IPv4)" },
                        "speed": { "type": "STRING", "description": "Link Speed (1G, 10G, etc.)" },
                        "type": {
                            "type": "STRING",
                            "description": "Type: Management, ExaNIC, Solarflare, or Standard"
                        }
                    }
                }
            }
        },
        "required": ["manufacturer", "model", "cpuModel", "cpuCount", "ramGb", "interfaces"]
    })
}

// ── Response ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
