//! Capability gating for radio discovery.
//!
//! The required-capability set depends on the platform version: before the
//! scoped-scan version, discovery piggybacks on the coarse location grant;
//! from that version on the platform exposes a dedicated scan grant and the
//! location requirement is dropped. The gate itself is a pure function of
//! its inputs and is recomputed on every check; nothing here is persisted.

use std::collections::BTreeSet;

use async_trait::async_trait;
use bluescout_model::{Capability, PlatformVersion};

use crate::error::Result;

const LEGACY_REQUIRED: &[Capability] = &[
    Capability::Radio,
    Capability::RadioAdmin,
    Capability::CoarseLocation,
];

const SCOPED_REQUIRED: &[Capability] = &[
    Capability::Radio,
    Capability::RadioAdmin,
    Capability::RadioScan,
];

/// The capability set a discovery operation needs on `version`.
pub fn required_capabilities(version: PlatformVersion) -> &'static [Capability] {
    if version.requires_location() {
        LEGACY_REQUIRED
    } else {
        SCOPED_REQUIRED
    }
}

/// Required capabilities not present in `granted`. Empty means discovery may
/// proceed.
pub fn missing_capabilities(
    version: PlatformVersion,
    granted: &BTreeSet<Capability>,
) -> BTreeSet<Capability> {
    required_capabilities(version)
        .iter()
        .copied()
        .filter(|capability| !granted.contains(capability))
        .collect()
}

pub fn has_sufficient_permissions(
    version: PlatformVersion,
    granted: &BTreeSet<Capability>,
) -> bool {
    missing_capabilities(version, granted).is_empty()
}

/// How the coordinator observes the running platform version and the grants
/// currently held.
#[cfg_attr(test, mockall::automock)]
pub trait CapabilityProbe: Send + Sync {
    fn platform_version(&self) -> PlatformVersion;
    fn granted(&self) -> BTreeSet<Capability>;
}

/// The interactive OS grant flow. Implementations raise the platform modal;
/// callers re-check the gate once the future resolves, since the user may
/// have granted any subset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CapabilityRequester: Send + Sync {
    async fn request(&self, required: &[Capability]) -> Result<()>;
}
