use std::sync::Arc;
use std::time::Duration;

use bluescout_model::{DeviceRecord, ScanOutcome};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{DiscoveryError, Result};
use crate::radio::{Advertisements, LowEnergyRadio};

/// Drives one advertisement-listening pass against the low-energy radio
/// service.
pub(crate) struct LowEnergyScanner {
    radio: Arc<dyn LowEnergyRadio>,
    timeout: Duration,
}

impl LowEnergyScanner {
    pub(crate) fn new(radio: Arc<dyn LowEnergyRadio>, timeout: Duration) -> Self {
        Self { radio, timeout }
    }

    /// Register the result callback and begin listening. Failure surfaces
    /// synchronously with no scan left running.
    pub(crate) async fn start(&self) -> Result<LowEnergyPass> {
        let results = self
            .radio
            .start_scan()
            .await
            .map_err(|err| DiscoveryError::StartFailed(err.to_string()))?;
        Ok(LowEnergyPass {
            radio: Arc::clone(&self.radio),
            results,
            timeout: self.timeout,
        })
    }
}

/// A live advertisement scan. Owns the platform scan until `drive` stops it.
pub(crate) struct LowEnergyPass {
    radio: Arc<dyn LowEnergyRadio>,
    results: Advertisements,
    timeout: Duration,
}

impl std::fmt::Debug for LowEnergyPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LowEnergyPass")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LowEnergyPass {
    pub(crate) async fn drive(
        mut self,
        found: mpsc::Sender<DeviceRecord>,
        cancel: CancellationToken,
    ) -> ScanOutcome {
        // Advertisement listening has no natural end; this timer is the only
        // thing that bounds the pass besides cancellation.
        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        let outcome = loop {
            tokio::select! {
                _ = cancel.cancelled() => break ScanOutcome::Cancelled,
                _ = &mut deadline => {
                    debug!(timeout = ?self.timeout, "advertisement window elapsed");
                    break ScanOutcome::Completed;
                }
                result = self.results.next() => match result {
                    Some(advertisement) => match advertisement.device {
                        Some(raw) => {
                            trace!(address = %raw.address, "advertisement reported a device");
                            if found.send(raw.into_record()).await.is_err() {
                                break ScanOutcome::Cancelled;
                            }
                        }
                        None => {
                            trace!("advertisement without a device handle skipped");
                        }
                    },
                    None => {
                        break ScanOutcome::Failed {
                            error: "advertisement stream closed by the platform"
                                .into(),
                        };
                    }
                },
            }
        };

        if let Err(err) = self.radio.stop_scan().await {
            warn!(error = %err, "stopping the advertisement scan failed");
        }
        outcome
    }
}
