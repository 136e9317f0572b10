//! Test doubles for the scan workflow: a scripted extractor and a clock that
//! records pauses instead of waiting.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use super::clock::Clock;
use crate::domain::types::*;
use crate::extraction::{ExtractionError, LogExtractor, VendorHint};

pub fn sample_result() -> ExtractionResult {
    ExtractionResult {
        manufacturer: "Dell".to_string(),
        model: "PowerEdge R760".to_string(),
        cpu_model: "Intel(R) Xeon(R) Platinum 8480+".to_string(),
        sockets: 2,
        ram_gb: 1024,
        interfaces: vec![
            NetworkInterface {
                name: "eno1".to_string(),
                ip: "10.20.1.9".to_string(),
                speed: InterfaceSpeed::Gbps1,
                kind: InterfaceKind::Management,
            },
            NetworkInterface {
                name: "exanic0".to_string(),
                ip: "192.168.100.19".to_string(),
                speed: InterfaceSpeed::Gbps25,
                kind: InterfaceKind::ExaNic,
            },
        ],
    }
}

pub struct FakeExtractor {
    generate_ok: AtomicBool,
    parse_ok: AtomicBool,
    result: Mutex<ExtractionResult>,
    generate_calls: AtomicUsize,
    parse_calls: AtomicUsize,
    last_parsed: Mutex<Option<String>>,
    gated: bool,
    parse_entered: Notify,
    parse_gate: Notify,
}

impl FakeExtractor {
    pub const SYNTHETIC_LOG: &'static str = "System Information: Manufacturer: Dell Inc.";

    fn new(generate_ok: bool, parse_ok: bool) -> Self {
        Self {
            generate_ok: AtomicBool::new(generate_ok),
            parse_ok: AtomicBool::new(parse_ok),
            result: Mutex::new(sample_result()),
            generate_calls: AtomicUsize::new(0),
            parse_calls: AtomicUsize::new(0),
            last_parsed: Mutex::new(None),
            gated: false,
            parse_entered: Notify::new(),
            parse_gate: Notify::new(),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(true, true)
    }

    pub fn failing_generation() -> Self {
        Self::new(false, true)
    }

    pub fn failing_parse() -> Self {
        Self::new(true, false)
    }

    /// Hold every `parse_log` call until [`release_parse`](Self::release_parse).
    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub async fn wait_for_parse(&self) {
        self.parse_entered.notified().await;
    }

    pub fn release_parse(&self) {
        self.parse_gate.notify_one();
    }

    pub fn set_parse_ok(&self) {
        self.parse_ok.store(true, Ordering::SeqCst);
    }

    pub fn set_result(&self, result: ExtractionResult) {
        *self.result.lock().unwrap() = result;
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn parse_calls(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }

    pub fn last_parsed(&self) -> Option<String> {
        self.last_parsed.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogExtractor for FakeExtractor {
    async fn generate_synthetic_log(&self, _hint: VendorHint) -> Result<String, ExtractionError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.generate_ok.load(Ordering::SeqCst) {
            Ok(Self::SYNTHETIC_LOG.to_string())
        } else {
            Err(ExtractionError::Unavailable("upstream returned 503".to_string()))
        }
    }

    async fn parse_log(&self, raw: &str) -> Result<ExtractionResult, ExtractionError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_parsed.lock().unwrap() = Some(raw.to_string());
        if self.gated {
            self.parse_entered.notify_one();
            self.parse_gate.notified().await;
        }
        if self.parse_ok.load(Ordering::SeqCst) {
            Ok(self.result.lock().unwrap().clone())
        } else {
            Err(ExtractionError::ParseFailure("non-conforming response".to_string()))
        }
    }
}

pub struct RecordingClock {
    now: DateTime<Utc>,
    pauses: Mutex<Vec<Duration>>,
}

impl Default for RecordingClock {
    fn default() -> Self {
        Self {
            now: Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
            pauses: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingClock {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
