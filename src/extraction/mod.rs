//! Log extraction: turns free-form inspection output into an
//! [`ExtractionResult`] via an external inference service.
//!
//! The workflow only sees the [`LogExtractor`] trait; `gemini` is the one
//! production implementation.

pub mod gemini;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::ExtractionResult;

pub use gemini::GeminiExtractor;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// Synthetic log generation failed or produced no text.
    #[error("log generation unavailable: {0}")]
    Unavailable(String),

    /// Structured extraction failed, was empty, or did not match the schema.
    #[error("failed to parse server logs: {0}")]
    ParseFailure(String),
}

#[async_trait]
pub trait LogExtractor: Send + Sync {
    /// Produce text resembling `dmidecode`/`lscpu`/`ip addr` output.
    async fn generate_synthetic_log(&self, hint: VendorHint) -> Result<String, ExtractionError>;

    /// Extract the hardware description from raw log text.
    async fn parse_log(&self, raw: &str) -> Result<ExtractionResult, ExtractionError>;
}

/// CPU vendor the synthetic log should describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorHint {
    Intel,
    #[serde(rename = "AMD")]
    Amd,
}

impl VendorHint {
    pub fn cpu_family(&self) -> &'static str {
        match self {
            VendorHint::Intel => "Intel Xeon Platinum 8400 series",
            VendorHint::Amd => "AMD EPYC 9004 series",
        }
    }
}

/// How a scan picks its vendor hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorPreference {
    #[default]
    Random,
    Intel,
    Amd,
}

impl VendorPreference {
    pub fn pick(&self) -> VendorHint {
        match self {
            VendorPreference::Intel => VendorHint::Intel,
            VendorPreference::Amd => VendorHint::Amd,
            VendorPreference::Random => {
                if rand::rng().random_bool(0.5) {
                    VendorHint::Intel
                } else {
                    VendorHint::Amd
                }
            }
        }
    }
}

impl std::str::FromStr for VendorPreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(VendorPreference::Random),
            "intel" => Ok(VendorPreference::Intel),
            "amd" => Ok(VendorPreference::Amd),
            other => anyhow::bail!("unknown vendor hint '{}': expected random, intel or amd", other),
        }
    }
}

/// Parse the JSON text returned by a structured extraction call.
///
/// Only well-formedness is checked; field values are taken as returned.
pub fn decode_extraction(text: &str) -> Result<ExtractionResult, ExtractionError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::ParseFailure("no response text".to_string()));
    }
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| ExtractionError::ParseFailure(format!("non-conforming response: {}", e)))
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    text.strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|t| t.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(text)
}
