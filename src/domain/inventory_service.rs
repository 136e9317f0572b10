//! Inventory service: owns the store, search history, jump-host settings and
//! the daemon's single scan session, and wires them together.
//!
//! API handlers only go through this service; none of the state is global.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::extraction::LogExtractor;
use crate::scan::{Clock, ScanError, ScanSnapshot, ScanWorkflow};

use super::export;
use super::history::SearchHistory;
use super::inventory::InventoryStore;
use super::jump_host::JumpHostSettings;
use super::seed;
use super::types::{JumpServerConfig, ServerRecord};

pub struct InventoryService {
    store: RwLock<InventoryStore>,
    history: RwLock<SearchHistory>,
    jump: RwLock<JumpHostSettings>,
    scan: ScanWorkflow,
}

impl InventoryService {
    /// Build from configuration: seed the store and set the initial jump host.
    pub fn new(
        config: &Config,
        extractor: Arc<dyn LogExtractor>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut records = Vec::new();
        if config.inventory.seed_demo {
            records.extend(seed::demo_servers(clock.now()));
        }
        if let Some(path) = &config.inventory.seed_file {
            let seeded = seed::load_file(path)?;
            info!(path = %path.display(), count = seeded.len(), "loaded seed inventory");
            records.extend(seeded);
        }

        let scan = ScanWorkflow::new(
            extractor,
            clock,
            config.scan.pacing,
            config.scan.vendor_hint,
        );

        let store = InventoryStore::with_records(records);
        if store.is_empty() {
            info!("inventory starts empty");
        }

        Ok(Self::from_parts(
            store,
            JumpHostSettings::new(config.jump_host.clone()),
            scan,
        ))
    }

    pub fn from_parts(store: InventoryStore, jump: JumpHostSettings, scan: ScanWorkflow) -> Self {
        Self {
            store: RwLock::new(store),
            history: RwLock::new(SearchHistory::new()),
            jump: RwLock::new(jump),
            scan,
        }
    }

    // ── Inventory ──────────────────────────────────────────

    pub async fn servers(&self, query: &str) -> Vec<ServerRecord> {
        self.store
            .read()
            .await
            .filter(query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn server(&self, id: &str) -> Option<ServerRecord> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn add_server(&self, record: ServerRecord) {
        info!(id = %record.id, hostname = %record.hostname, "adding server");
        self.store.write().await.add(record);
    }

    pub async fn remove_server(&self, id: &str) -> Option<ServerRecord> {
        let removed = self.store.write().await.remove(id);
        if let Some(r) = &removed {
            info!(id = %r.id, hostname = %r.hostname, "removed server");
        }
        removed
    }

    pub async fn select_server(&self, id: &str) -> Option<ServerRecord> {
        self.store.write().await.select(id).cloned()
    }

    pub async fn selected_server(&self) -> Option<ServerRecord> {
        self.store.read().await.selected().cloned()
    }

    pub async fn clear_selection(&self) {
        self.store.write().await.clear_selection();
    }

    pub async fn server_count(&self) -> usize {
        self.store.read().await.len()
    }

    /// CSV of the whole inventory plus today's download filename.
    pub async fn export_csv(&self) -> Result<(String, String)> {
        let store = self.store.read().await;
        let filename = export::export_filename(Utc::now().date_naive());
        Ok((export::to_csv(store.list())?, filename))
    }

    // ── Search history ─────────────────────────────────────

    pub async fn record_search(&self, query: &str) -> Vec<String> {
        let mut history = self.history.write().await;
        history.record(query);
        history.entries().to_vec()
    }

    pub async fn search_history(&self) -> Vec<String> {
        self.history.read().await.entries().to_vec()
    }

    pub async fn clear_search_history(&self) {
        let mut history = self.history.write().await;
        if history.is_empty() {
            return;
        }
        info!(cleared = history.len(), "clearing search history");
        history.clear();
    }

    // ── Jump host ──────────────────────────────────────────

    pub async fn jump_host(&self) -> JumpServerConfig {
        self.jump.read().await.get()
    }

    pub async fn jump_host_configured(&self) -> bool {
        self.jump.read().await.configured().is_some()
    }

    pub async fn save_jump_host(&self, config: JumpServerConfig) {
        let mut jump = self.jump.write().await;
        match jump.configured() {
            Some(previous) => info!(
                hostname = %config.hostname,
                port = config.port,
                previous = %previous.hostname,
                "replacing jump host configuration"
            ),
            None => info!(hostname = %config.hostname, port = config.port, "saving jump host configuration"),
        }
        jump.save(config);
    }

    // ── Scan session ───────────────────────────────────────

    pub fn scan(&self) -> &ScanWorkflow {
        &self.scan
    }

    /// Claim the scan session, then run the sequence in the background.
    /// The busy flag is set before this returns, so a concurrent start is
    /// rejected instead of queued.
    pub async fn spawn_scan(self: &Arc<Self>) -> Result<ScanSnapshot, ScanError> {
        let ticket = self.scan.begin_scan().await?;
        let jump = self.jump_host().await;
        let snap = self.scan.snapshot().await;

        let service = Arc::clone(self);
        tokio::spawn(async move {
            match service.scan.run_scan(ticket, &jump).await {
                Ok(_) | Err(ScanError::Abandoned) => {}
                Err(e) => warn!(error = %e, "background scan ended with an error"),
            }
        });
        Ok(snap)
    }

    /// Commit the reviewed scan into the store.
    pub async fn commit_scan(&self) -> Result<ServerRecord, ScanError> {
        let mut store = self.store.write().await;
        self.scan.commit(&mut store).await
    }
}
