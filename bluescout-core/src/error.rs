use std::collections::BTreeSet;

use bluescout_model::Capability;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("missing capabilities: {}", format_capabilities(.missing))]
    PermissionDenied { missing: BTreeSet<Capability> },

    #[error("radio unavailable: {0}")]
    RadioUnavailable(String),

    #[error("a scan session is already running")]
    ScanInProgress,

    #[error("scan start failed: {0}")]
    StartFailed(String),

    #[error("teardown failed: {0}")]
    Teardown(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

fn format_capabilities(capabilities: &BTreeSet<Capability>) -> String {
    capabilities
        .iter()
        .map(Capability::label)
        .collect::<Vec<_>>()
        .join(", ")
}
