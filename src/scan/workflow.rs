//! Scan workflow: Input → Terminal → Review, with an explicit Closed state.
//!
//! The handle is cheap to clone; all clones drive the same session. Each
//! reset (discard, cancel, commit) bumps the session epoch, and every write
//! made after a suspension point checks the epoch first, so results that
//! arrive after a reset are dropped instead of leaking into the new session.

use std::sync::Arc;

use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::script::{self, ScriptStep};
use crate::domain::inventory::InventoryStore;
use crate::domain::types::{
    generate_hostname, ExtractionResult, JumpServerConfig, ServerRecord, FALLBACK_MANAGEMENT_IP,
};
use crate::extraction::{ExtractionError, LogExtractor, VendorPreference};

const LINE_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
pub enum ScanPhase {
    Closed,
    Input,
    Terminal,
    Review,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPhase::Closed => write!(f, "closed"),
            ScanPhase::Input => write!(f, "input"),
            ScanPhase::Terminal => write!(f, "terminal"),
            ScanPhase::Review => write!(f, "review"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("a scan operation is already in progress")]
    Busy,

    #[error("scan workflow is in the {actual} phase, expected {expected}")]
    WrongPhase {
        expected: ScanPhase,
        actual: ScanPhase,
    },

    #[error("a target management IP is required to start a scan")]
    MissingTarget,

    #[error("no log text to parse")]
    MissingLog,

    #[error("no extraction result to commit")]
    NothingToReview,

    #[error("scan session was reset before the operation finished")]
    Abandoned,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    pub phase: ScanPhase,
    pub target_ip: String,
    pub manual_log: String,
    /// Banner transcript, newline-terminated lines.
    pub transcript: String,
    pub busy: bool,
    pub error: Option<String>,
    pub result: Option<ExtractionResult>,
}

#[derive(Debug)]
struct SessionState {
    phase: ScanPhase,
    target_ip: String,
    manual_log: String,
    transcript: Vec<String>,
    busy: bool,
    error: Option<String>,
    result: Option<ExtractionResult>,
    epoch: u64,
}

impl SessionState {
    fn closed() -> Self {
        Self {
            phase: ScanPhase::Closed,
            target_ip: String::new(),
            manual_log: String::new(),
            transcript: Vec::new(),
            busy: false,
            error: None,
            result: None,
            epoch: 0,
        }
    }

    /// Drop all transient data and invalidate in-flight operations.
    fn reset(&mut self, phase: ScanPhase) {
        let epoch = self.epoch + 1;
        *self = Self::closed();
        self.phase = phase;
        self.epoch = epoch;
    }

    fn expect_phase(&self, expected: ScanPhase) -> Result<(), ScanError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ScanError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn snapshot(&self) -> ScanSnapshot {
        let mut transcript = String::new();
        for line in &self.transcript {
            transcript.push_str(line);
            transcript.push('\n');
        }
        ScanSnapshot {
            phase: self.phase,
            target_ip: self.target_ip.clone(),
            manual_log: self.manual_log.clone(),
            transcript,
            busy: self.busy,
            error: self.error.clone(),
            result: self.result.clone(),
        }
    }
}

/// Proof that [`ScanWorkflow::begin_scan`] claimed the session.
#[derive(Debug)]
pub struct ScanTicket {
    epoch: u64,
    target: String,
    pasted: Option<String>,
}

struct Inner {
    state: Mutex<SessionState>,
    extractor: Arc<dyn LogExtractor>,
    clock: Arc<dyn Clock>,
    pacing: bool,
    vendor: VendorPreference,
    lines: broadcast::Sender<String>,
}

#[derive(Clone)]
pub struct ScanWorkflow {
    inner: Arc<Inner>,
}

impl ScanWorkflow {
    pub fn new(
        extractor: Arc<dyn LogExtractor>,
        clock: Arc<dyn Clock>,
        pacing: bool,
        vendor: VendorPreference,
    ) -> Self {
        let (lines, _) = broadcast::channel(LINE_BUFFER);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::closed()),
                extractor,
                clock,
                pacing,
                vendor,
                lines,
            }),
        }
    }

    /// Live feed of transcript lines as they are appended.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.inner.lines.subscribe()
    }

    pub async fn snapshot(&self) -> ScanSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    /// Open the workflow at Input. Already-open sessions are left untouched.
    pub async fn open(&self) -> ScanSnapshot {
        let mut s = self.inner.state.lock().await;
        if s.phase == ScanPhase::Closed {
            s.reset(ScanPhase::Input);
        }
        s.snapshot()
    }

    pub async fn set_target_ip(&self, ip: &str) -> Result<(), ScanError> {
        let mut s = self.idle_state().await?;
        s.expect_phase(ScanPhase::Input)?;
        s.target_ip = ip.to_string();
        Ok(())
    }

    pub async fn set_manual_log(&self, text: &str) -> Result<(), ScanError> {
        let mut s = self.idle_state().await?;
        s.expect_phase(ScanPhase::Input)?;
        s.manual_log = text.to_string();
        Ok(())
    }

    /// Automated path: play the session banners, obtain the log text (pasted
    /// text if any, otherwise a synthetic log), then parse it.
    ///
    /// Success moves to Review. Failure appends the error banner, clears the
    /// busy flag and stays in Terminal with the transcript intact.
    pub async fn start_scan(&self, jump: &JumpServerConfig) -> Result<ExtractionResult, ScanError> {
        let ticket = self.begin_scan().await?;
        self.run_scan(ticket, jump).await
    }

    /// Claim the session for an automated scan: validate, mark busy and move
    /// to Terminal. A second caller gets `Busy` until the scan finishes.
    pub async fn begin_scan(&self) -> Result<ScanTicket, ScanError> {
        let mut s = self.idle_state().await?;
        if !matches!(s.phase, ScanPhase::Input | ScanPhase::Terminal) {
            return Err(ScanError::WrongPhase {
                expected: ScanPhase::Input,
                actual: s.phase,
            });
        }
        let target = s.target_ip.trim().to_string();
        if target.is_empty() {
            return Err(ScanError::MissingTarget);
        }
        let pasted = Some(s.manual_log.clone()).filter(|l| !l.trim().is_empty());

        s.busy = true;
        s.phase = ScanPhase::Terminal;
        s.transcript.clear();
        s.error = None;
        Ok(ScanTicket {
            epoch: s.epoch,
            target,
            pasted,
        })
    }

    /// Play the sequence for a scan claimed by [`begin_scan`](Self::begin_scan).
    pub async fn run_scan(
        &self,
        ticket: ScanTicket,
        jump: &JumpServerConfig,
    ) -> Result<ExtractionResult, ScanError> {
        let ScanTicket {
            epoch,
            target,
            pasted,
        } = ticket;

        info!(target_ip = %target, jump_host = %jump.hostname, "starting scan");

        let now = self.inner.clock.now();
        self.play(epoch, script::connect_steps(jump, &target, now))
            .await?;

        let raw = match pasted {
            Some(text) => text,
            None => {
                let hint = self.inner.vendor.pick();
                match self.inner.extractor.generate_synthetic_log(hint).await {
                    Ok(text) => text,
                    Err(e) => return self.fail(epoch, e).await,
                }
            }
        };

        self.append(epoch, raw.clone()).await?;
        self.play(epoch, script::disconnect_steps(jump, &target))
            .await?;
        self.play(epoch, script::parsing_steps()).await?;

        let parsed = self.inner.extractor.parse_log(&raw).await;
        let result = match parsed {
            Ok(result) => result,
            Err(e) => return self.fail(epoch, e).await,
        };

        let mut s = self.current(epoch).await?;
        s.busy = false;
        s.phase = ScanPhase::Review;
        s.result = Some(result.clone());
        info!(
            target_ip = %target,
            manufacturer = %result.manufacturer,
            model = %result.model,
            "scan parsed, awaiting review"
        );
        Ok(result)
    }

    /// Manual path: parse the pasted text straight from Input.
    pub async fn parse_manual(&self) -> Result<ExtractionResult, ScanError> {
        let (epoch, raw) = {
            let mut s = self.idle_state().await?;
            s.expect_phase(ScanPhase::Input)?;
            let raw = s.manual_log.clone();
            if raw.trim().is_empty() {
                return Err(ScanError::MissingLog);
            }
            s.busy = true;
            s.error = None;
            (s.epoch, raw)
        };

        let parsed = self.inner.extractor.parse_log(&raw).await;

        let mut s = self.current(epoch).await?;
        s.busy = false;
        match parsed {
            Ok(result) => {
                s.phase = ScanPhase::Review;
                s.result = Some(result.clone());
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "manual log parse failed");
                s.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Review → Input, dropping target, transcript and result.
    pub async fn discard(&self) -> Result<ScanSnapshot, ScanError> {
        let mut s = self.inner.state.lock().await;
        s.expect_phase(ScanPhase::Review)?;
        s.reset(ScanPhase::Input);
        Ok(s.snapshot())
    }

    /// Close from any phase without committing. In-flight work is abandoned.
    pub async fn cancel(&self) -> ScanSnapshot {
        let mut s = self.inner.state.lock().await;
        if s.busy {
            debug!(epoch = s.epoch, "cancelling scan with an operation in flight");
        }
        s.reset(ScanPhase::Closed);
        s.snapshot()
    }

    /// Turn the reviewed result into a record, add it to `store`, then reset
    /// and close the workflow.
    pub async fn commit(&self, store: &mut InventoryStore) -> Result<ServerRecord, ScanError> {
        let mut s = self.inner.state.lock().await;
        s.expect_phase(ScanPhase::Review)?;
        let result = s.result.clone().ok_or(ScanError::NothingToReview)?;

        let target = s.target_ip.trim();
        let management_ip = if !target.is_empty() {
            target.to_string()
        } else {
            result
                .management_interface_ip()
                .unwrap_or(FALLBACK_MANAGEMENT_IP)
                .to_string()
        };

        let hostname = generate_hostname(&result.manufacturer);
        let record = ServerRecord::from_extraction(
            result,
            management_ip,
            store.fresh_id(),
            hostname,
            self.inner.clock.now(),
        );
        store.add(record.clone());
        s.reset(ScanPhase::Closed);

        info!(id = %record.id, hostname = %record.hostname, "scan committed to inventory");
        Ok(record)
    }

    // ── Internal helpers ───────────────────────────────────

    async fn idle_state(&self) -> Result<MutexGuard<'_, SessionState>, ScanError> {
        let s = self.inner.state.lock().await;
        if s.busy {
            return Err(ScanError::Busy);
        }
        Ok(s)
    }

    /// Lock the state only if the session has not been reset since `epoch`.
    async fn current(&self, epoch: u64) -> Result<MutexGuard<'_, SessionState>, ScanError> {
        let s = self.inner.state.lock().await;
        if s.epoch != epoch {
            debug!(stale = epoch, current = s.epoch, "dropping stale scan result");
            return Err(ScanError::Abandoned);
        }
        Ok(s)
    }

    async fn append(&self, epoch: u64, line: String) -> Result<(), ScanError> {
        let mut s = self.current(epoch).await?;
        // no subscribers is fine
        let _ = self.inner.lines.send(line.clone());
        s.transcript.push(line);
        Ok(())
    }

    async fn play(&self, epoch: u64, steps: Vec<ScriptStep>) -> Result<(), ScanError> {
        for step in steps {
            match step {
                ScriptStep::Line(line) => self.append(epoch, line).await?,
                ScriptStep::Pause(d) => {
                    if self.inner.pacing {
                        self.inner.clock.sleep(d).await;
                    }
                }
            }
        }
        drop(self.current(epoch).await?);
        Ok(())
    }

    async fn fail<T>(&self, epoch: u64, error: ExtractionError) -> Result<T, ScanError> {
        warn!(error = %error, "scan failed");
        for step in script::error_steps() {
            if let ScriptStep::Line(line) = step {
                self.append(epoch, line).await?;
            }
        }
        let mut s = self.current(epoch).await?;
        s.busy = false;
        s.error = Some(error.to_string());
        Err(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::testing::{sample_result, FakeExtractor, RecordingClock};
    use std::time::Duration;

    fn workflow(fake: &Arc<FakeExtractor>, clock: &Arc<RecordingClock>) -> ScanWorkflow {
        ScanWorkflow::new(fake.clone(), clock.clone(), true, VendorPreference::Intel)
    }

    #[tokio::test]
    async fn test_automated_scan_reaches_review_with_ordered_banners() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        wf.set_target_ip("10.20.1.9").await.unwrap();
        let result = wf.start_scan(&JumpServerConfig::default()).await.unwrap();
        assert_eq!(result, sample_result());

        let snap = wf.snapshot().await;
        assert_eq!(snap.phase, ScanPhase::Review);
        assert!(!snap.busy);

        let lines: Vec<&str> = snap.transcript.lines().collect();
        assert_eq!(lines[0], "[local]$ initiating on-demand session to jump.infra.local...");
        assert_eq!(lines[1], "[local]$ ssh -p 22 admin@jump.infra.local");
        assert_eq!(lines[2], "admin@jump.infra.local's password: **********");
        let gather = lines
            .iter()
            .position(|l| *l == "[root@10.20.1.9 ~]$ gathering system info...")
            .unwrap();
        assert_eq!(lines[gather + 1], FakeExtractor::SYNTHETIC_LOG);
        assert_eq!(*lines.last().unwrap(), script::PARSING_BANNER);

        assert_eq!(
            clock.pauses(),
            [400, 600, 500, 800, 600, 400, 300]
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect::<Vec<_>>()
        );
        assert_eq!(fake.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_pacing_disabled_never_sleeps() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = ScanWorkflow::new(fake.clone(), clock.clone(), false, VendorPreference::Amd);

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        wf.start_scan(&JumpServerConfig::default()).await.unwrap();
        assert!(clock.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_pasted_log_skips_generation() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        wf.set_manual_log("pasted lscpu output").await.unwrap();
        wf.start_scan(&JumpServerConfig::default()).await.unwrap();

        assert_eq!(fake.generate_calls(), 0);
        assert_eq!(fake.last_parsed().as_deref(), Some("pasted lscpu output"));
    }

    #[tokio::test]
    async fn test_missing_target_does_not_start() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        wf.set_target_ip("   ").await.unwrap();
        assert!(matches!(
            wf.start_scan(&JumpServerConfig::default()).await,
            Err(ScanError::MissingTarget)
        ));
        assert_eq!(wf.snapshot().await.phase, ScanPhase::Input);
    }

    #[tokio::test]
    async fn test_generation_failure_stays_in_terminal_with_transcript() {
        let fake = Arc::new(FakeExtractor::failing_generation());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);
        let mut store = InventoryStore::new();

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        let err = wf.start_scan(&JumpServerConfig::default()).await.unwrap_err();
        assert!(matches!(
            err,
            ScanError::Extraction(ExtractionError::Unavailable(_))
        ));

        let snap = wf.snapshot().await;
        assert_eq!(snap.phase, ScanPhase::Terminal);
        assert!(!snap.busy);
        assert!(snap.error.is_some());
        assert!(snap.transcript.contains("gathering system info"));
        assert!(snap.transcript.trim_end().ends_with(script::ERROR_BANNER));
        assert_eq!(fake.parse_calls(), 0);

        assert!(matches!(
            wf.commit(&mut store).await,
            Err(ScanError::WrongPhase { .. })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_commits_nothing_and_allows_retry() {
        let fake = Arc::new(FakeExtractor::failing_parse());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);
        let mut store = InventoryStore::new();

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        assert!(wf.start_scan(&JumpServerConfig::default()).await.is_err());
        assert_ne!(wf.snapshot().await.phase, ScanPhase::Review);
        assert!(wf.commit(&mut store).await.is_err());
        assert!(store.is_empty());

        // user re-initiates from the terminal
        fake.set_parse_ok();
        wf.start_scan(&JumpServerConfig::default()).await.unwrap();
        assert_eq!(wf.snapshot().await.phase, ScanPhase::Review);
    }

    #[tokio::test]
    async fn test_manual_parse_paths() {
        let fake = Arc::new(FakeExtractor::failing_parse());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        assert!(matches!(wf.parse_manual().await, Err(ScanError::MissingLog)));

        wf.set_manual_log("ip addr output").await.unwrap();
        assert!(wf.parse_manual().await.is_err());
        let snap = wf.snapshot().await;
        assert_eq!(snap.phase, ScanPhase::Input);
        assert!(!snap.busy);
        assert!(snap.error.is_some());
        assert!(snap.transcript.is_empty());

        fake.set_parse_ok();
        wf.parse_manual().await.unwrap();
        assert_eq!(wf.snapshot().await.phase, ScanPhase::Review);
        assert!(clock.pauses().is_empty());
    }

    #[tokio::test]
    async fn test_discard_then_reopen_is_clean() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        wf.start_scan(&JumpServerConfig::default()).await.unwrap();
        wf.discard().await.unwrap();
        wf.cancel().await;

        let snap = wf.open().await;
        assert_eq!(snap.phase, ScanPhase::Input);
        assert!(snap.target_ip.is_empty());
        assert!(snap.transcript.is_empty());
        assert!(snap.result.is_none());
    }

    #[tokio::test]
    async fn test_commit_uses_target_ip_and_closes() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);
        let mut store = InventoryStore::new();

        wf.open().await;
        wf.set_target_ip(" 10.0.0.42 ").await.unwrap();
        wf.start_scan(&JumpServerConfig::default()).await.unwrap();
        let record = wf.commit(&mut store).await.unwrap();

        assert_eq!(record.management_ip, "10.0.0.42");
        assert_eq!(record.core_count, 64);
        assert_eq!(record.last_scanned, clock.now());
        assert!(record.hostname.starts_with("server-dell-"));
        assert_eq!(store.get(&record.id), Some(&record));
        assert_eq!(wf.snapshot().await.phase, ScanPhase::Closed);
    }

    #[tokio::test]
    async fn test_commit_management_ip_fallbacks() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);
        let mut store = InventoryStore::new();

        wf.open().await;
        wf.set_manual_log("raw").await.unwrap();
        wf.parse_manual().await.unwrap();
        let record = wf.commit(&mut store).await.unwrap();
        assert_eq!(record.management_ip, "10.20.1.9");

        let mut no_mgmt = sample_result();
        no_mgmt.interfaces.clear();
        fake.set_result(no_mgmt);
        wf.open().await;
        wf.set_manual_log("raw").await.unwrap();
        wf.parse_manual().await.unwrap();
        let record = wf.commit(&mut store).await.unwrap();
        assert_eq!(record.management_ip, FALLBACK_MANAGEMENT_IP);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_start_is_rejected_while_busy() {
        let fake = Arc::new(FakeExtractor::succeeding().gated());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        let running = {
            let wf = wf.clone();
            tokio::spawn(async move { wf.start_scan(&JumpServerConfig::default()).await })
        };
        fake.wait_for_parse().await;

        assert!(wf.snapshot().await.busy);
        assert!(matches!(
            wf.start_scan(&JumpServerConfig::default()).await,
            Err(ScanError::Busy)
        ));
        assert!(matches!(
            wf.set_target_ip("10.0.0.2").await,
            Err(ScanError::Busy)
        ));

        fake.release_parse();
        assert!(running.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_result_after_cancel_is_ignored() {
        let fake = Arc::new(FakeExtractor::succeeding().gated());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        let running = {
            let wf = wf.clone();
            tokio::spawn(async move { wf.start_scan(&JumpServerConfig::default()).await })
        };
        fake.wait_for_parse().await;

        wf.cancel().await;
        let reopened = wf.open().await;
        fake.release_parse();

        assert!(matches!(running.await.unwrap(), Err(ScanError::Abandoned)));
        let snap = wf.snapshot().await;
        assert_eq!(snap.phase, ScanPhase::Input);
        assert!(snap.result.is_none());
        assert!(snap.transcript.is_empty());
        assert_eq!(reopened.phase, ScanPhase::Input);
    }

    #[tokio::test]
    async fn test_subscribers_see_lines_live() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);
        let mut rx = wf.subscribe();

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        wf.start_scan(&JumpServerConfig::default()).await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            "[local]$ initiating on-demand session to jump.infra.local..."
        );
    }

    #[tokio::test]
    async fn test_discard_outside_review_is_rejected() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        assert!(matches!(
            wf.discard().await,
            Err(ScanError::WrongPhase {
                expected: ScanPhase::Review,
                actual: ScanPhase::Input
            })
        ));
    }

    #[tokio::test]
    async fn test_begin_scan_claims_session() {
        let fake = Arc::new(FakeExtractor::succeeding());
        let clock = Arc::new(RecordingClock::default());
        let wf = workflow(&fake, &clock);

        wf.open().await;
        wf.set_target_ip("10.0.0.1").await.unwrap();
        let ticket = wf.begin_scan().await.unwrap();

        let snap = wf.snapshot().await;
        assert!(snap.busy);
        assert_eq!(snap.phase, ScanPhase::Terminal);
        assert!(matches!(wf.begin_scan().await, Err(ScanError::Busy)));

        wf.run_scan(ticket, &JumpServerConfig::default()).await.unwrap();
        assert_eq!(wf.snapshot().await.phase, ScanPhase::Review);
        assert_eq!(fake.generate_calls(), 1);
    }
}
