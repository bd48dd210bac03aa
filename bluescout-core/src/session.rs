//! Per-session discovery state.
//!
//! A session is one bounded start-to-finish discovery attempt. Its state
//! word is atomic so the cancel path and the pass's own completion path can
//! race safely: whichever side wins the check-and-set owns completion
//! reporting, and the loser backs off without a second report.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};

use bluescout_model::{
    DeviceAddress, ScanMode, ScanState, SessionId, SessionSnapshot,
};
use chrono::{DateTime, Utc};

const RUNNING: u8 = 0;
const CANCELLING: u8 = 1;
const DONE: u8 = 2;

/// State for one discovery session: identity, lifecycle word, and the
/// address set that backs the dedup guarantee.
#[derive(Debug)]
pub struct ScanSession {
    id: SessionId,
    mode: ScanMode,
    started_at: DateTime<Utc>,
    state: AtomicU8,
    finished_at: Mutex<Option<DateTime<Utc>>>,
    seen: Mutex<HashSet<DeviceAddress>>,
}

impl ScanSession {
    pub(crate) fn new(mode: ScanMode) -> Self {
        Self {
            id: SessionId::new(),
            mode,
            started_at: Utc::now(),
            state: AtomicU8::new(RUNNING),
            finished_at: Mutex::new(None),
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn state(&self) -> ScanState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => ScanState::Running,
            CANCELLING => ScanState::Cancelling,
            _ => ScanState::Done,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }

    /// Claim completion reporting for the natural-finish path. True exactly
    /// once, and never after [`Self::begin_cancel`] won.
    pub(crate) fn try_complete(&self) -> bool {
        let won = self
            .state
            .compare_exchange(RUNNING, DONE, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if won {
            self.stamp_finished();
        }
        won
    }

    /// Claim completion reporting for the cancel path. True exactly once,
    /// and never after the session already finished naturally.
    pub(crate) fn begin_cancel(&self) -> bool {
        let won = self
            .state
            .compare_exchange(
                RUNNING,
                CANCELLING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if won {
            self.stamp_finished();
        }
        won
    }

    /// Close out a cancelled session once its platform teardown finished.
    pub(crate) fn mark_done(&self) {
        self.state.store(DONE, Ordering::SeqCst);
    }

    /// Dedup check-and-insert. True only the first time `address` is seen
    /// within this session.
    pub(crate) fn observe(&self, address: &DeviceAddress) -> bool {
        let mut seen = self.seen.lock().expect("seen set poisoned");
        seen.insert(address.clone())
    }

    pub fn devices_seen(&self) -> usize {
        self.seen.lock().expect("seen set poisoned").len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            mode: self.mode,
            state: self.state(),
            started_at: self.started_at,
            finished_at: *self.finished_at.lock().expect("finished_at poisoned"),
            devices_seen: self.devices_seen(),
        }
    }

    fn stamp_finished(&self) {
        *self.finished_at.lock().expect("finished_at poisoned") =
            Some(Utc::now());
    }
}
