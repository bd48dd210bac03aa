//! Ports onto the two platform radio services.
//!
//! Both services are opaque collaborators: the classic-inquiry service is an
//! event-subscription mechanism with explicit registration teardown, the
//! low-energy service a result-callback mechanism with no natural end. Each
//! port hands its events back as a boxed stream so scanner passes can drive
//! them from a select loop.

use async_trait::async_trait;
use bluescout_model::{DeviceAddress, DeviceCategory, DeviceRecord};
use futures::stream::BoxStream;

use crate::error::Result;

/// Stream of inquiry lifecycle events from a live registration.
pub type InquiryEvents = BoxStream<'static, InquiryEvent>;

/// Stream of advertisement results from a live low-energy scan.
pub type Advertisements = BoxStream<'static, Advertisement>;

/// The platform's untyped view of a discovered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDevice {
    pub address: String,
    pub name: Option<String>,
    pub class_code: Option<u32>,
    /// Signal strength at report time; platform-level detail that
    /// normalization drops.
    pub rssi: Option<i16>,
}

impl RawDevice {
    /// Normalize into the uniform record: name falls back to
    /// [`DeviceRecord::UNKNOWN_NAME`] when the platform has none (or denied
    /// the read), the category is classified from the raw class code.
    pub fn into_record(self) -> DeviceRecord {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => DeviceRecord::UNKNOWN_NAME.to_string(),
        };
        DeviceRecord::new(
            name,
            DeviceAddress::new(&self.address),
            DeviceCategory::classify(self.class_code),
        )
    }
}

/// Events delivered by a classic-inquiry registration.
#[derive(Debug, Clone)]
pub enum InquiryEvent {
    Started,
    DeviceFound(RawDevice),
    Finished,
}

/// One low-energy advertisement result. The platform occasionally reports a
/// result whose device handle is absent; such results carry nothing usable.
#[derive(Debug, Clone)]
pub struct Advertisement {
    pub device: Option<RawDevice>,
}

/// The classic-inquiry platform service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassicRadio: Send + Sync {
    async fn is_powered(&self) -> Result<bool>;

    /// Register for inquiry events. The registration stays live until
    /// [`Self::unsubscribe`] tears it down.
    async fn subscribe(&self) -> Result<InquiryEvents>;

    async fn unsubscribe(&self) -> Result<()>;

    /// Ask the platform to begin an inquiry. `false` means the platform
    /// refused without raising an error.
    async fn start_inquiry(&self) -> Result<bool>;

    /// Ask the platform to abort the running inquiry. A finished event is
    /// not reliably delivered afterwards, so callers finalize themselves.
    async fn cancel_inquiry(&self) -> Result<bool>;
}

/// The low-energy advertisement platform service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LowEnergyRadio: Send + Sync {
    async fn is_powered(&self) -> Result<bool>;

    /// Register the result callback and begin advertisement listening.
    async fn start_scan(&self) -> Result<Advertisements>;

    async fn stop_scan(&self) -> Result<()>;
}
