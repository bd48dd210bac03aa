//! Core data model definitions shared across bluescout crates.
#![allow(missing_docs)]

pub mod capability;
pub mod category;
pub mod device;
pub mod ids;
pub mod scan;

pub use capability::{Capability, PlatformVersion};
pub use category::DeviceCategory;
pub use device::{DeviceAddress, DeviceRecord};
pub use ids::SessionId;
pub use scan::{ScanMode, ScanOutcome, ScanState, SessionSnapshot};
