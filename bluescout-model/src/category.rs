use std::fmt;

/// Major device-class bits of a raw class-of-device code (bits 8..13).
const MAJOR_CLASS_MASK: u32 = 0x1F00;

const MAJOR_COMPUTER: u32 = 0x0100;
const MAJOR_PHONE: u32 = 0x0200;
const MAJOR_AUDIO_VIDEO: u32 = 0x0400;
const MAJOR_PERIPHERAL: u32 = 0x0500;
const MAJOR_IMAGING: u32 = 0x0600;
const MAJOR_HEALTH: u32 = 0x0900;

/// Coarse category derived from the raw class-of-device code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceCategory {
    Phone,
    Computer,
    AudioVideo,
    Peripheral,
    Imaging,
    Health,
    Unknown,
}

impl DeviceCategory {
    /// Total over the class-code space: any code outside the mapped major
    /// classes, and an absent code, both classify as [`Self::Unknown`].
    pub fn classify(class_code: Option<u32>) -> Self {
        match class_code.map(|code| code & MAJOR_CLASS_MASK) {
            Some(MAJOR_COMPUTER) => DeviceCategory::Computer,
            Some(MAJOR_PHONE) => DeviceCategory::Phone,
            Some(MAJOR_AUDIO_VIDEO) => DeviceCategory::AudioVideo,
            Some(MAJOR_PERIPHERAL) => DeviceCategory::Peripheral,
            Some(MAJOR_IMAGING) => DeviceCategory::Imaging,
            Some(MAJOR_HEALTH) => DeviceCategory::Health,
            _ => DeviceCategory::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeviceCategory::Phone => "Phone",
            DeviceCategory::Computer => "Computer",
            DeviceCategory::AudioVideo => "Audio/Video",
            DeviceCategory::Peripheral => "Peripheral",
            DeviceCategory::Imaging => "Imaging Device",
            DeviceCategory::Health => "Health Device",
            DeviceCategory::Unknown => "Unknown Type",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
