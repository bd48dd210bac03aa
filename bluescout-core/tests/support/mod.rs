//! Channel-backed radio fakes and helpers shared by the integration tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bluescout_core::error::{DiscoveryError, Result};
use bluescout_core::events::DiscoveryEvent;
use bluescout_core::permissions::{self, CapabilityProbe};
use bluescout_core::radio::{
    Advertisement, Advertisements, ClassicRadio, InquiryEvent, InquiryEvents,
    LowEnergyRadio, RawDevice,
};
use bluescout_model::{Capability, PlatformVersion};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Capability probe with fixed platform version and grants.
pub struct StaticProbe {
    version: PlatformVersion,
    granted: BTreeSet<Capability>,
}

impl StaticProbe {
    /// A fully granted probe on a platform with the dedicated scan grant.
    pub fn scoped() -> Self {
        let version = PlatformVersion(33);
        Self {
            version,
            granted: permissions::required_capabilities(version)
                .iter()
                .copied()
                .collect(),
        }
    }
}

impl CapabilityProbe for StaticProbe {
    fn platform_version(&self) -> PlatformVersion {
        self.version
    }

    fn granted(&self) -> BTreeSet<Capability> {
        self.granted.clone()
    }
}

/// Classic-inquiry fake fed from test-owned event senders. Every `subscribe`
/// opens a fresh channel so one fake can serve several sessions.
pub struct ScriptedClassicRadio {
    accept_inquiry: bool,
    senders: Mutex<Vec<mpsc::UnboundedSender<InquiryEvent>>>,
    pub subscribes: AtomicUsize,
    pub unsubscribes: AtomicUsize,
    pub inquiry_cancels: AtomicUsize,
}

impl ScriptedClassicRadio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accept_inquiry: true,
            senders: Mutex::new(Vec::new()),
            subscribes: AtomicUsize::new(0),
            unsubscribes: AtomicUsize::new(0),
            inquiry_cancels: AtomicUsize::new(0),
        })
    }

    /// A radio whose begin-inquiry call is refused by the platform.
    pub fn refusing_inquiries() -> Arc<Self> {
        Arc::new(Self {
            accept_inquiry: false,
            senders: Mutex::new(Vec::new()),
            subscribes: AtomicUsize::new(0),
            unsubscribes: AtomicUsize::new(0),
            inquiry_cancels: AtomicUsize::new(0),
        })
    }

    /// Sender feeding the most recent subscription.
    pub fn sender(&self) -> mpsc::UnboundedSender<InquiryEvent> {
        self.senders
            .lock()
            .unwrap()
            .last()
            .expect("no live subscription")
            .clone()
    }

    /// Drop every registration-side sender, closing the event stream the way
    /// a collapsing platform registration would.
    pub fn close(&self) {
        self.senders.lock().unwrap().clear();
    }
}

#[async_trait]
impl ClassicRadio for ScriptedClassicRadio {
    async fn is_powered(&self) -> Result<bool> {
        Ok(true)
    }

    async fn subscribe(&self) -> Result<InquiryEvents> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn unsubscribe(&self) -> Result<()> {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start_inquiry(&self) -> Result<bool> {
        Ok(self.accept_inquiry)
    }

    async fn cancel_inquiry(&self) -> Result<bool> {
        self.inquiry_cancels.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

/// Low-energy fake mirroring [`ScriptedClassicRadio`] for the
/// advertisement-callback service.
pub struct ScriptedLowEnergyRadio {
    fail_start: bool,
    senders: Mutex<Vec<mpsc::UnboundedSender<Advertisement>>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl ScriptedLowEnergyRadio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail_start: false,
            senders: Mutex::new(Vec::new()),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        })
    }

    pub fn refusing_scans() -> Arc<Self> {
        Arc::new(Self {
            fail_start: true,
            senders: Mutex::new(Vec::new()),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        })
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Advertisement> {
        self.senders
            .lock()
            .unwrap()
            .last()
            .expect("no live scan")
            .clone()
    }
}

#[async_trait]
impl LowEnergyRadio for ScriptedLowEnergyRadio {
    async fn is_powered(&self) -> Result<bool> {
        Ok(true)
    }

    async fn start_scan(&self) -> Result<Advertisements> {
        if self.fail_start {
            return Err(DiscoveryError::StartFailed(
                "platform refused to start the advertisement scan".into(),
            ));
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn stop_scan(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn raw_device(
    address: &str,
    name: Option<&str>,
    class_code: Option<u32>,
) -> RawDevice {
    RawDevice {
        address: address.to_string(),
        name: name.map(str::to_string),
        class_code,
        rssi: Some(-52),
    }
}

/// Receive events until the session's completion report arrives.
pub async fn collect_until_complete(
    rx: &mut broadcast::Receiver<DiscoveryEvent>,
) -> Vec<DiscoveryEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for the completion event")
            .expect("event bus closed");
        let done = matches!(event, DiscoveryEvent::Completed { .. });
        events.push(event);
        if done {
            return events;
        }
    }
}

/// Poll a fake's call counter until it reaches `expected`.
pub async fn wait_for_count(counter: &AtomicUsize, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while counter.load(Ordering::SeqCst) < expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("counter never reached the expected value");
}
