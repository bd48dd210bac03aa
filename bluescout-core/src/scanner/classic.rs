use std::collections::BTreeSet;
use std::sync::Arc;

use bluescout_model::{Capability, DeviceRecord, ScanOutcome};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{DiscoveryError, Result};
use crate::permissions::CapabilityProbe;
use crate::radio::{ClassicRadio, InquiryEvent, InquiryEvents};

/// Drives one inquiry-based discovery pass against the classic radio
/// service.
pub(crate) struct ClassicScanner {
    radio: Arc<dyn ClassicRadio>,
    permissions: Arc<dyn CapabilityProbe>,
}

impl ClassicScanner {
    pub(crate) fn new(
        radio: Arc<dyn ClassicRadio>,
        permissions: Arc<dyn CapabilityProbe>,
    ) -> Self {
        Self { radio, permissions }
    }

    /// Register for inquiry events and ask the platform to begin. Any
    /// failure here surfaces synchronously and leaves no live registration
    /// behind.
    pub(crate) async fn start(&self) -> Result<ClassicPass> {
        // Legacy platform versions refuse inquiries without the location
        // grant; surfacing that here keeps the session from ever looking
        // started.
        let version = self.permissions.platform_version();
        if version.requires_location()
            && !self
                .permissions
                .granted()
                .contains(&Capability::CoarseLocation)
        {
            warn!(%version, "inquiry requires the location grant on this platform version");
            return Err(DiscoveryError::PermissionDenied {
                missing: BTreeSet::from([Capability::CoarseLocation]),
            });
        }

        let events = self.radio.subscribe().await?;

        match self.radio.start_inquiry().await {
            Ok(true) => Ok(ClassicPass {
                radio: Arc::clone(&self.radio),
                events,
            }),
            Ok(false) => {
                self.drop_registration().await;
                Err(DiscoveryError::StartFailed(
                    "platform refused to begin inquiry".into(),
                ))
            }
            Err(err) => {
                self.drop_registration().await;
                Err(DiscoveryError::StartFailed(err.to_string()))
            }
        }
    }

    async fn drop_registration(&self) {
        if let Err(err) = self.radio.unsubscribe().await {
            warn!(error = %err, "inquiry unsubscribe after failed start");
        }
    }
}

/// A live inquiry registration. Owns the subscription until `drive` tears it
/// down.
pub(crate) struct ClassicPass {
    radio: Arc<dyn ClassicRadio>,
    events: InquiryEvents,
}

impl std::fmt::Debug for ClassicPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassicPass").finish_non_exhaustive()
    }
}

impl ClassicPass {
    pub(crate) async fn drive(
        mut self,
        found: mpsc::Sender<DeviceRecord>,
        cancel: CancellationToken,
    ) -> ScanOutcome {
        let outcome = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    // The platform does not reliably deliver a finished
                    // event after a cancel, so finalize without waiting for
                    // one.
                    match self.radio.cancel_inquiry().await {
                        Ok(true) => debug!("platform inquiry cancelled"),
                        Ok(false) => warn!("platform refused to cancel inquiry"),
                        Err(err) => warn!(error = %err, "inquiry cancel failed"),
                    }
                    break ScanOutcome::Cancelled;
                }
                event = self.events.next() => match event {
                    Some(InquiryEvent::Started) => {
                        debug!("platform inquiry started");
                    }
                    Some(InquiryEvent::DeviceFound(raw)) => {
                        trace!(address = %raw.address, "inquiry reported a device");
                        if found.send(raw.into_record()).await.is_err() {
                            break ScanOutcome::Cancelled;
                        }
                    }
                    Some(InquiryEvent::Finished) => break ScanOutcome::Completed,
                    None => {
                        break ScanOutcome::Failed {
                            error: "inquiry event stream closed before the \
                                    inquiry finished"
                                .into(),
                        };
                    }
                },
            }
        };

        if let Err(err) = self.radio.unsubscribe().await {
            warn!(error = %err, "inquiry unsubscribe failed");
        }
        outcome
    }
}
