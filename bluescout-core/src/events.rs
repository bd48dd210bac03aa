use bluescout_model::{DeviceRecord, ScanMode, ScanOutcome, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Consumer-facing discovery notifications, append-only per session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DiscoveryEvent {
    Started {
        session: SessionId,
        mode: ScanMode,
    },
    DeviceFound {
        session: SessionId,
        record: DeviceRecord,
    },
    Completed {
        session: SessionId,
        outcome: ScanOutcome,
    },
}

/// Lightweight in-process event bus that fans discovery notifications out to
/// observers. Publishing never blocks; events published with no subscriber
/// attached are dropped.
#[derive(Clone, Debug)]
pub struct DiscoveryEventBus {
    sender: broadcast::Sender<DiscoveryEvent>,
}

impl DiscoveryEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: DiscoveryEvent) {
        let _ = self.sender.send(event);
    }
}
