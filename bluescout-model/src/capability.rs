use std::fmt;

/// A named permission grant required before a radio operation is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    Radio,
    RadioAdmin,
    RadioScan,
    CoarseLocation,
}

impl Capability {
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Radio => "radio",
            Capability::RadioAdmin => "radio-admin",
            Capability::RadioScan => "radio-scan",
            Capability::CoarseLocation => "coarse-location",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric platform API level the process is running under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlatformVersion(pub u32);

impl PlatformVersion {
    /// First version with a dedicated scan capability. Older versions gate
    /// discovery behind the coarse location grant instead.
    pub const SCOPED_SCAN: PlatformVersion = PlatformVersion(31);

    pub fn requires_location(self) -> bool {
        self < Self::SCOPED_SCAN
    }

    pub fn has_scan_capability(self) -> bool {
        !self.requires_location()
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
