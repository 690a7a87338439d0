//! Timestamp sensor views
//!
//! One sensor per exposed prayer time. Sensors are passive readers: they
//! take a consistent snapshot from the coordinator and become unavailable
//! when the last refresh failed, without tearing anything down.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use salat_calc::Prayer;
use salat_coordinator::PrayerTimesCoordinator;

/// Attribute key for the auxiliary Islamic calendar date
pub const ATTR_HIJRI_DATE: &str = "hijri_date";

/// Static description of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    /// The exposed event
    pub key: Prayer,
    /// Display name
    pub name: &'static str,
}

/// The exposed sensors, in the platform's registration order
///
/// Sunset is not exposed as a sensor of its own; Maghrib covers it.
pub const SENSOR_TYPES: [SensorDescription; 8] = [
    SensorDescription {
        key: Prayer::Fajr,
        name: "Fajr",
    },
    SensorDescription {
        key: Prayer::Sunrise,
        name: "Sunrise",
    },
    SensorDescription {
        key: Prayer::Dhuhr,
        name: "Dhuhr",
    },
    SensorDescription {
        key: Prayer::Asr,
        name: "Asr",
    },
    SensorDescription {
        key: Prayer::Maghrib,
        name: "Maghrib",
    },
    SensorDescription {
        key: Prayer::Isha,
        name: "Isha",
    },
    SensorDescription {
        key: Prayer::Imsak,
        name: "Imsak",
    },
    SensorDescription {
        key: Prayer::Midnight,
        name: "Midnight",
    },
];

/// A timestamp sensor over one prayer time
pub struct PrayerTimeSensor {
    coordinator: Arc<PrayerTimesCoordinator>,
    description: SensorDescription,
    unique_id: String,
}

impl PrayerTimeSensor {
    pub fn new(
        coordinator: Arc<PrayerTimesCoordinator>,
        description: SensorDescription,
        entry_id: &str,
    ) -> Self {
        Self {
            coordinator,
            unique_id: format!("{entry_id}-{}", description.key),
            description,
        }
    }

    /// Stable id, namespaced by the owning entry
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &'static str {
        self.description.name
    }

    /// The sensor value: an absolute UTC instant, `None` before the
    /// first refresh or when the event is undefined for this day
    pub fn native_value(&self) -> Option<DateTime<Utc>> {
        self.coordinator.data()?.get(self.description.key)
    }

    /// False while the last refresh attempt failed
    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    /// Auxiliary metadata: the Hijri date of the cached day
    pub fn extra_state_attributes(&self) -> HashMap<String, serde_json::Value> {
        let mut attributes = HashMap::new();
        if let Some(data) = self.coordinator.data() {
            attributes.insert(
                ATTR_HIJRI_DATE.to_string(),
                serde_json::Value::String(data.hijri_date),
            );
        }
        attributes
    }
}

/// Build the full sensor set for one entry
pub fn sensors_for_entry(
    coordinator: &Arc<PrayerTimesCoordinator>,
    entry_id: &str,
) -> Vec<PrayerTimeSensor> {
    SENSOR_TYPES
        .iter()
        .map(|description| PrayerTimeSensor::new(Arc::clone(coordinator), *description, entry_id))
        .collect()
}
