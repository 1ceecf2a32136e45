use serde::{Deserialize, Serialize};

/// Coarse visual classification of a feed volume, used to color feed
/// points on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Mid,
    MidHigh,
    High,
}

impl Intensity {
    /// Bucket a volume in milliliters by fixed thresholds.
    pub fn for_volume(volume_ml: u32) -> Self {
        match volume_ml {
            0..=40 => Self::Low,
            41..=70 => Self::Mid,
            71..=100 => Self::MidHigh,
            _ => Self::High,
        }
    }
}
