//! Config entry for one configured location

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::options::PrayerOptions;

/// One configured instance of the integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerEntry {
    /// Unique identifier (ULID)
    pub entry_id: String,
    /// Human-readable display name
    pub title: String,
    /// User-configurable options
    #[serde(default)]
    pub options: PrayerOptions,
}

impl PrayerEntry {
    /// Create an entry with a fresh id
    pub fn new(title: impl Into<String>, options: PrayerOptions) -> Self {
        Self {
            entry_id: Ulid::new().to_string(),
            title: title.into(),
            options,
        }
    }
}
