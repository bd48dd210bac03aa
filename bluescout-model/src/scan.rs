use std::{fmt, result::Result as StdResult, str::FromStr};

use chrono::{DateTime, Utc};

use crate::ids::SessionId;

/// Which platform discovery mechanism a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanMode {
    /// Inquiry-based discovery of devices in discoverable mode; the platform
    /// ends it on its own once the inquiry window closes.
    Classic,
    /// Passive advertisement listening; has no natural end and relies on an
    /// application-imposed timeout.
    LowEnergy,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Classic => write!(f, "classic"),
            ScanMode::LowEnergy => write!(f, "low-energy"),
        }
    }
}

impl FromStr for ScanMode {
    type Err = &'static str;

    fn from_str(s: &str) -> StdResult<Self, Self::Err> {
        match s {
            "classic" => Ok(ScanMode::Classic),
            "low-energy" => Ok(ScanMode::LowEnergy),
            _ => Err("unrecognized scan mode"),
        }
    }
}

/// Lifecycle states of the discovery coordinator.
///
/// `Idle` is the coordinator-level "no session" view; a live session only
/// moves `Running`, optionally through `Cancelling`, to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanState {
    Idle,
    Running,
    Cancelling,
    Done,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanOutcome {
    /// The pass ran to its natural finish (classic) or timed out (low-energy).
    Completed,
    Cancelled,
    /// The platform failed mid-scan; devices already reported stay valid.
    Failed { error: String },
}

/// Immutable view of one discovery session handed to consumers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub mode: ScanMode,
    pub state: ScanState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub devices_seen: usize,
}
