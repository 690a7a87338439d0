//! The refresh coordinator
//!
//! A single coordinator instance owns one location's cached prayer data
//! and all writes to it. It recomputes once per day at 02:01 local time
//! (late enough to dodge recomputation races at local midnight, early
//! enough that the new day's times are ready before anyone asks), and on
//! failure retries every [`RETRY_DELAY`] until a computation succeeds.
//! Exactly one scheduled trigger exists at a time: scheduling a new one
//! always aborts the previous handle.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use salat_calc::{CalcParams, Location, Prayer, TuneOffsets};

use crate::clock::{Clock, SystemClock};
use crate::error::{UpdateError, UpdateResult};
use crate::provider::{Calculator, DailySchedule, PrayerTimesProvider};

/// Delay before reattempting a failed computation
pub const RETRY_DELAY: StdDuration = StdDuration::from_secs(60);

/// Minutes past local midnight of the daily scheduled refresh (02:01)
const DAILY_TRIGGER_MINUTES: i64 = 2 * 60 + 1;

/// Capacity of the subscriber notification channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Configuration of one coordinator instance
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub location: Location,
    /// IANA timezone of the location; resolves the UTC offset (and DST)
    /// per date
    pub timezone: Tz,
    pub params: CalcParams,
    /// Display-level overrides in signed minutes per prayer, applied
    /// after the calculation. This carries local announcement conventions
    /// (such as calling Maghrib 15 minutes before computed sunset) and is
    /// deliberately kept out of the calculator itself.
    pub display_adjustments: TuneOffsets,
}

/// A consistent snapshot of one day's exposed prayer data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerData {
    /// Absolute UTC instants for today's defined events
    pub times: BTreeMap<Prayer, DateTime<Utc>>,
    /// Islamic calendar date, auxiliary metadata
    pub hijri_date: String,
}

impl PrayerData {
    /// UTC instant of an event, `None` if undefined for this day
    pub fn get(&self, prayer: Prayer) -> Option<DateTime<Utc>> {
        self.times.get(&prayer).copied()
    }
}

/// Notification sent to subscribers after every refresh attempt
///
/// Carries no payload; subscribers read the coordinator's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// New data is cached
    Updated,
    /// The attempt failed; the previous snapshot (if any) is unchanged
    UpdateFailed,
}

/// The single-slot scheduled trigger
#[derive(Default)]
struct TimerSlot {
    handle: Option<JoinHandle<()>>,
    fires_at: Option<DateTime<Utc>>,
}

/// Owns the cached prayer data for one location and keeps it fresh
pub struct PrayerTimesCoordinator {
    config: CoordinatorConfig,
    provider: Arc<dyn PrayerTimesProvider>,
    clock: Arc<dyn Clock>,
    /// Last successful snapshot; replaced whole, never mutated in place
    data: RwLock<Option<PrayerData>>,
    last_update_success: AtomicBool,
    /// Serializes refresh attempts: one computation in flight at a time
    refresh_lock: AsyncMutex<()>,
    timer: Mutex<TimerSlot>,
    events: broadcast::Sender<CoordinatorEvent>,
    shut_down: AtomicBool,
}

impl PrayerTimesCoordinator {
    /// Create a coordinator computing with the standard calculator
    pub fn new(config: CoordinatorConfig) -> Arc<Self> {
        let provider = Arc::new(Calculator::new(config.location, config.params.clone()));
        Self::with_parts(config, provider, Arc::new(SystemClock))
    }

    /// Create a coordinator with an explicit provider and clock
    pub fn with_parts(
        config: CoordinatorConfig,
        provider: Arc<dyn PrayerTimesProvider>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            config,
            provider,
            clock,
            data: RwLock::new(None),
            last_update_success: AtomicBool::new(false),
            refresh_lock: AsyncMutex::new(()),
            timer: Mutex::new(TimerSlot::default()),
            events,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Subscribe to refresh notifications
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    /// The last successful snapshot, `None` before the first success
    pub fn data(&self) -> Option<PrayerData> {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether the most recent refresh attempt succeeded
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::SeqCst)
    }

    /// Instant of the pending scheduled trigger, if any
    pub fn next_refresh_at(&self) -> Option<DateTime<Utc>> {
        self.timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .fires_at
    }

    /// Initial refresh, run once at setup
    ///
    /// Blocks until the first computation finishes. Failure is returned
    /// to the caller as a setup-level error; a retry is still scheduled,
    /// so the instance recovers on its own if the caller keeps it.
    pub async fn first_refresh(self: &Arc<Self>) -> UpdateResult<()> {
        self.refresh().await
    }

    /// On-demand refresh (options change, explicit user request)
    ///
    /// Supersedes any pending scheduled trigger. Failures are logged and
    /// signalled to subscribers, never propagated.
    pub async fn request_refresh(self: &Arc<Self>) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "prayer times refresh failed");
        }
    }

    /// Cancel all pending timers and refuse further refreshes
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        self.cancel_timer();
        debug!("prayer times coordinator shut down");
    }

    async fn refresh(self: &Arc<Self>) -> UpdateResult<()> {
        let _guard = self.refresh_lock.lock().await;
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(UpdateError::ShutDown);
        }

        let now = self.clock.now();
        let local_now = now.with_timezone(&self.config.timezone);
        let date = local_now.date_naive();
        let utc_offset_hours = f64::from(local_now.offset().fix().local_minus_utc()) / 3600.0;

        // The calculation is CPU-bound; keep it off the async workers.
        let provider = Arc::clone(&self.provider);
        let result = tokio::task::spawn_blocking(move || {
            provider.daily_schedule(date, utc_offset_hours)
        })
        .await
        .map_err(|err| UpdateError::Task(err.to_string()))
        .and_then(|computed| computed.map_err(UpdateError::from));

        match result {
            Ok(schedule) => {
                let data = self.build_data(&schedule, date);
                debug!(
                    date = %date,
                    defined = data.times.len(),
                    hijri_date = %data.hijri_date,
                    "computed prayer times"
                );
                *self
                    .data
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(data);
                self.last_update_success.store(true, Ordering::SeqCst);

                let next = next_refresh_instant(now, self.config.timezone);
                info!(next_refresh = %next, "prayer times updated");
                self.schedule_refresh_at(next);
                let _ = self.events.send(CoordinatorEvent::Updated);
                Ok(())
            }
            Err(err) => {
                // Cached times stay as they are; consumers see the
                // failure flag plus the previous snapshot.
                self.last_update_success.store(false, Ordering::SeqCst);
                warn!(
                    date = %date,
                    error = %err,
                    retry_in = ?RETRY_DELAY,
                    "prayer time computation failed"
                );
                let retry_at = now + Duration::seconds(RETRY_DELAY.as_secs() as i64);
                self.schedule_refresh_at(retry_at);
                let _ = self.events.send(CoordinatorEvent::UpdateFailed);
                Err(err)
            }
        }
    }

    /// Map the day's local clock times onto absolute UTC instants and
    /// apply the display adjustments
    fn build_data(&self, schedule: &DailySchedule, date: NaiveDate) -> PrayerData {
        let mut times = BTreeMap::new();
        for (prayer, time) in schedule.times.iter() {
            let naive = date.and_time(time);
            // A local time erased by a DST gap has no instant; skip it.
            let Some(local) = self.config.timezone.from_local_datetime(&naive).earliest()
            else {
                continue;
            };
            let adjustment = Duration::minutes(i64::from(
                self.config.display_adjustments.get(prayer),
            ));
            times.insert(prayer, local.with_timezone(&Utc) + adjustment);
        }
        PrayerData {
            times,
            hijri_date: schedule.hijri_date.to_string(),
        }
    }

    /// Replace the scheduled trigger with one firing at `instant`
    ///
    /// Aborting the previous handle is safe if it already fired or was
    /// cancelled; a fired trigger replacing itself has no remaining await
    /// points, so the abort is a no-op.
    fn schedule_refresh_at(self: &Arc<Self>, instant: DateTime<Utc>) {
        if self.shut_down.load(Ordering::SeqCst) {
            return;
        }
        let delay = (instant - self.clock.now())
            .to_std()
            .unwrap_or(StdDuration::ZERO);
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(coordinator) = weak.upgrade() {
                coordinator.request_refresh().await;
            }
        });

        let mut slot = self
            .timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.fires_at = Some(instant);
        if let Some(previous) = slot.handle.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_timer(&self) {
        let mut slot = self
            .timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.fires_at = None;
        if let Some(handle) = slot.handle.take() {
            handle.abort();
        }
    }
}

/// Instant of the next daily trigger: 02:01 local time of the day after
/// `now`
pub fn next_refresh_instant(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let next_day = now.with_timezone(&tz).date_naive() + Duration::days(1);
    let target = next_day.and_time(NaiveTime::MIN) + Duration::minutes(DAILY_TRIGGER_MINUTES);
    // If a DST gap erases 02:01, slide forward an hour at a time.
    for extra_hours in 0..3 {
        let naive = target + Duration::hours(extra_hours);
        if let Some(local) = tz.from_local_datetime(&naive).earliest() {
            return local.with_timezone(&Utc);
        }
    }
    // No zone gaps three consecutive hours; interpret 02:01 through the
    // current offset rather than abandoning the trigger time.
    let offset = now.with_timezone(&tz).offset().fix();
    Utc.from_utc_datetime(&(target - Duration::seconds(i64::from(offset.local_minus_utc()))))
}
