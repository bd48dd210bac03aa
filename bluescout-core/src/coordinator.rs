//! Scan lifecycle coordination.
//!
//! The coordinator is the single entry and exit point for discovery. It
//! gates starts behind the capability check and adapter power state, selects
//! the scanner for the requested mode, and owns the per-session pump that
//! deduplicates found devices before re-publishing them on the
//! consumer-facing bus. Cancellation flips the session out of `Running`
//! synchronously and leaves the platform teardown to the pass task, so a
//! fresh start is accepted immediately without racing the old finalize.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bluescout_model::{
    Capability, DeviceRecord, ScanMode, ScanOutcome, ScanState, SessionId,
    SessionSnapshot,
};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::events::{DiscoveryEvent, DiscoveryEventBus};
use crate::permissions::{self, CapabilityProbe, CapabilityRequester};
use crate::radio::{ClassicRadio, LowEnergyRadio};
use crate::scanner::{ClassicScanner, LowEnergyScanner, ScanPass};
use crate::session::ScanSession;

/// One in-flight (or just-finished) discovery session and the handles the
/// coordinator keeps over it.
struct ActiveScan {
    session: Arc<ScanSession>,
    cancel: CancellationToken,
    pump: JoinHandle<()>,
}

/// Owns scan lifecycle state, selects which scanner to run, deduplicates
/// results, and exposes start/cancel to the consumer.
pub struct ScanCoordinator {
    classic: Arc<dyn ClassicRadio>,
    low_energy: Arc<dyn LowEnergyRadio>,
    permissions: Arc<dyn CapabilityProbe>,
    config: DiscoveryConfig,
    events: DiscoveryEventBus,
    scanning: watch::Sender<bool>,
    active: Mutex<Option<ActiveScan>>,
}

impl fmt::Debug for ScanCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanCoordinator")
            .field("config", &self.config)
            .field("scanning", &*self.scanning.borrow())
            .finish()
    }
}

impl ScanCoordinator {
    pub fn new(
        classic: Arc<dyn ClassicRadio>,
        low_energy: Arc<dyn LowEnergyRadio>,
        permissions: Arc<dyn CapabilityProbe>,
        config: DiscoveryConfig,
    ) -> Self {
        let events = DiscoveryEventBus::new(config.event_capacity);
        let (scanning, _) = watch::channel(false);
        Self {
            classic,
            low_energy,
            permissions,
            config,
            events,
            scanning,
            active: Mutex::new(None),
        }
    }

    /// Subscribe to the live discovery event sequence.
    pub fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.events.subscribe()
    }

    /// The consumer-facing scanning flag. True from a successful start until
    /// the session's single completion report.
    pub fn scanning(&self) -> watch::Receiver<bool> {
        self.scanning.subscribe()
    }

    pub fn is_scanning(&self) -> bool {
        *self.scanning.borrow()
    }

    /// Coordinator-level lifecycle state: `Idle` when no session exists.
    pub async fn state(&self) -> ScanState {
        match self.active.lock().await.as_ref() {
            Some(active) => active.session.state(),
            None => ScanState::Idle,
        }
    }

    /// Snapshot of the current (or most recent) session.
    pub async fn session(&self) -> Option<SessionSnapshot> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|active| active.session.snapshot())
    }

    /// Begin a discovery session for `mode`.
    ///
    /// Rejects while a session is running; checks the capability gate and
    /// adapter power before any platform registration, so a failed start
    /// creates no session state at all.
    pub async fn start_scan(&self, mode: ScanMode) -> Result<SessionId> {
        let mut active = self.active.lock().await;
        if let Some(current) = active.as_ref()
            && current.session.is_running()
        {
            warn!(
                session = %current.session.id(),
                "scan start rejected while a session is running"
            );
            return Err(DiscoveryError::ScanInProgress);
        }

        let version = self.permissions.platform_version();
        let missing = permissions::missing_capabilities(
            version,
            &self.permissions.granted(),
        );
        if !missing.is_empty() {
            warn!(%version, ?missing, "scan start blocked by the capability gate");
            return Err(DiscoveryError::PermissionDenied { missing });
        }

        let powered = match mode {
            ScanMode::Classic => self.classic.is_powered().await?,
            ScanMode::LowEnergy => self.low_energy.is_powered().await?,
        };
        if !powered {
            return Err(DiscoveryError::RadioUnavailable(
                "adapter is not powered".into(),
            ));
        }

        let pass = match mode {
            ScanMode::Classic => ScanPass::Classic(
                ClassicScanner::new(
                    Arc::clone(&self.classic),
                    Arc::clone(&self.permissions),
                )
                .start()
                .await?,
            ),
            ScanMode::LowEnergy => ScanPass::LowEnergy(
                LowEnergyScanner::new(
                    Arc::clone(&self.low_energy),
                    self.config.low_energy_timeout,
                )
                .start()
                .await?,
            ),
        };

        let session = Arc::new(ScanSession::new(mode));
        let cancel = CancellationToken::new();
        let (found_tx, found_rx) = mpsc::channel(self.config.found_capacity);

        self.scanning.send_replace(true);
        self.events.publish(DiscoveryEvent::Started {
            session: session.id(),
            mode,
        });
        info!(session = %session.id(), %mode, "scan started");

        let pump = tokio::spawn(Self::pump(
            Arc::clone(&session),
            found_rx,
            pass.drive(found_tx, cancel.child_token()),
            self.events.clone(),
            self.scanning.clone(),
        ));

        let id = session.id();
        *active = Some(ActiveScan {
            session,
            cancel,
            pump,
        });
        Ok(id)
    }

    /// Cancel the running session for `mode`. A no-op when no session is
    /// running or the running session is for a different mode.
    ///
    /// The winner of the cancel reports completion synchronously and flips
    /// the session out of `Running`; the platform teardown happens on the
    /// pass task, so this never blocks on the radio stack.
    pub async fn cancel_scan(&self, mode: ScanMode) -> Result<()> {
        let active = self.active.lock().await;
        let Some(current) = active.as_ref() else {
            debug!("cancel requested with no session");
            return Ok(());
        };
        if current.session.mode() != mode {
            debug!(
                active = %current.session.mode(),
                requested = %mode,
                "cancel requested for a different mode"
            );
            return Ok(());
        }
        if !self.cancel_active(current) {
            debug!(
                session = %current.session.id(),
                "cancel requested after the session already ended"
            );
        }
        Ok(())
    }

    /// Cancel any in-flight session and wait for its pump task to drain.
    pub async fn shutdown(&self) {
        let taken = self.active.lock().await.take();
        if let Some(scan) = taken {
            self.cancel_active(&scan);
            scan.cancel.cancel();
            if let Err(err) = scan.pump.await {
                warn!(error = %err, "scan pump task failed");
            }
        }
    }

    /// Decide whether the interactive grant flow is needed, fire it with the
    /// full required set when it is, and re-check the gate afterwards.
    /// Returns the capabilities still missing once the flow resolved.
    pub async fn request_missing_capabilities(
        &self,
        requester: &dyn CapabilityRequester,
    ) -> Result<BTreeSet<Capability>> {
        let version = self.permissions.platform_version();
        let missing = permissions::missing_capabilities(
            version,
            &self.permissions.granted(),
        );
        if missing.is_empty() {
            return Ok(missing);
        }
        requester
            .request(permissions::required_capabilities(version))
            .await?;
        Ok(permissions::missing_capabilities(
            version,
            &self.permissions.granted(),
        ))
    }

    fn cancel_active(&self, scan: &ActiveScan) -> bool {
        if !scan.session.begin_cancel() {
            return false;
        }
        info!(session = %scan.session.id(), "scan cancelled");
        self.scanning.send_replace(false);
        self.events.publish(DiscoveryEvent::Completed {
            session: scan.session.id(),
            outcome: ScanOutcome::Cancelled,
        });
        scan.cancel.cancel();
        true
    }

    /// Per-session task: consumes the pass's found-device channel, dedups,
    /// and re-publishes, then reports completion exactly once.
    async fn pump(
        session: Arc<ScanSession>,
        mut found: mpsc::Receiver<DeviceRecord>,
        drive: impl Future<Output = ScanOutcome>,
        events: DiscoveryEventBus,
        scanning: watch::Sender<bool>,
    ) {
        tokio::pin!(drive);
        let mut open = true;
        let outcome = loop {
            tokio::select! {
                outcome = &mut drive => break outcome,
                maybe = found.recv(), if open => match maybe {
                    Some(record) => Self::forward(&session, &events, record),
                    None => open = false,
                },
            }
        };

        // The pass has resolved, so nothing sends on the channel anymore;
        // whatever is still queued must be delivered before completion is
        // reported.
        while let Ok(record) = found.try_recv() {
            Self::forward(&session, &events, record);
        }

        if session.try_complete() {
            info!(
                session = %session.id(),
                outcome = ?outcome,
                devices = session.devices_seen(),
                "scan finished"
            );
            scanning.send_replace(false);
            events.publish(DiscoveryEvent::Completed {
                session: session.id(),
                outcome,
            });
        } else {
            // The cancel path already reported completion.
            session.mark_done();
        }
    }

    fn forward(
        session: &ScanSession,
        events: &DiscoveryEventBus,
        record: DeviceRecord,
    ) {
        if !session.is_running() {
            trace!(address = %record.address, "report after session end dropped");
            return;
        }
        if session.observe(&record.address) {
            debug!(
                session = %session.id(),
                address = %record.address,
                category = %record.category,
                "device discovered"
            );
            events.publish(DiscoveryEvent::DeviceFound {
                session: session.id(),
                record,
            });
        } else {
            trace!(address = %record.address, "duplicate report suppressed");
        }
    }
}
