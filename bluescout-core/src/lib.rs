//! # Bluescout Core
//!
//! Scan lifecycle coordination for dual-mode wireless device discovery.
//!
//! The [`coordinator::ScanCoordinator`] is the single entry and exit point
//! for discovery: it gates starts behind the capability check, selects the
//! classic-inquiry or low-energy scanner, deduplicates device reports by
//! hardware address, and fans results out to consumers as they arrive. The
//! platform radio services and the interactive permission flow are injected
//! as ports, so the crate carries no platform bindings of its own.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Coordinator tunables
pub mod config;

/// Scan lifecycle coordination, mode selection, and result dedup
pub mod coordinator;

/// Error types and error handling utilities
pub mod error;

/// Consumer-facing discovery events and in-process fan-out
pub mod events;

/// Capability gate and permission collaborator ports
pub mod permissions;

/// Ports onto the two platform radio services
pub mod radio;

/// Inquiry and advertisement scan drivers
pub(crate) mod scanner;

/// Per-session discovery state
pub mod session;

pub use config::DiscoveryConfig;
pub use coordinator::ScanCoordinator;
pub use error::{DiscoveryError, Result};
pub use events::{DiscoveryEvent, DiscoveryEventBus};
