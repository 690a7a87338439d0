//! Host-integration layer for the prayer times service
//!
//! Generalizes the host platform's glue into explicit interfaces: a
//! config-entry type with validated options, a registry mapping entry ids
//! to coordinator instances with setup / options-updated / unload
//! lifecycle, and timestamp-sensor views over the cached data.

mod entry;
mod error;
mod options;
mod registry;
mod sensor;

pub use entry::PrayerEntry;
pub use error::{SetupError, SetupResult};
pub use options::PrayerOptions;
pub use registry::{IslamicPrayerTimes, DOMAIN};
pub use sensor::{sensors_for_entry, PrayerTimeSensor, SensorDescription, SENSOR_TYPES};
