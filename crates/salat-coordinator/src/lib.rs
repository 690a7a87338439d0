//! Daily refresh coordinator for prayer times
//!
//! The coordinator owns the cached [`PrayerData`] snapshot, recomputes it
//! once per day at 02:01 local time, retries failed computations on a
//! fixed delay, and notifies subscribers after every attempt. Readers
//! only ever observe a fully-formed snapshot.

mod clock;
mod coordinator;
mod error;
mod provider;

pub use clock::{Clock, SystemClock};
pub use coordinator::{
    next_refresh_instant, CoordinatorConfig, CoordinatorEvent, PrayerData,
    PrayerTimesCoordinator, RETRY_DELAY,
};
pub use error::{UpdateError, UpdateResult};
pub use provider::{Calculator, DailySchedule, PrayerTimesProvider};
