//! Scan drivers for the two discovery mechanisms.
//!
//! Each scanner splits one discovery attempt in two: `start()` performs the
//! quick platform calls (registration, begin) and fails synchronously, and
//! the returned pass owns the live subscription. A pass's `drive` future
//! pushes normalized records onto the coordinator's channel and performs the
//! platform teardown exactly once, at its single exit point, whichever way
//! the pass ends.

pub(crate) mod classic;
pub(crate) mod low_energy;

use bluescout_model::{DeviceRecord, ScanOutcome};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub(crate) use classic::{ClassicPass, ClassicScanner};
pub(crate) use low_energy::{LowEnergyPass, LowEnergyScanner};

/// A started discovery pass, ready to be driven by the coordinator pump.
pub(crate) enum ScanPass {
    Classic(ClassicPass),
    LowEnergy(LowEnergyPass),
}

impl ScanPass {
    pub(crate) async fn drive(
        self,
        found: mpsc::Sender<DeviceRecord>,
        cancel: CancellationToken,
    ) -> ScanOutcome {
        match self {
            ScanPass::Classic(pass) => pass.drive(found, cancel).await,
            ScanPass::LowEnergy(pass) => pass.drive(found, cancel).await,
        }
    }
}
