//! Prayer times service
//!
//! Demo entry point: sets up one entry with the default options, logs
//! every refresh, and keeps the daily schedule running until ctrl-c.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use salat_coordinator::CoordinatorEvent;
use salat_integration::{sensors_for_entry, IslamicPrayerTimes, PrayerEntry, PrayerOptions};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting prayer times service");

    let registry = IslamicPrayerTimes::new();
    let entry = PrayerEntry::new("Alexandria", PrayerOptions::default());
    let entry_id = entry.entry_id.clone();

    let coordinator = registry.setup_entry(entry).await?;
    let mut events = coordinator.subscribe();

    log_times(&coordinator, &entry_id);

    let watcher = {
        let coordinator = coordinator.clone();
        let entry_id = entry_id.clone();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    CoordinatorEvent::Updated => log_times(&coordinator, &entry_id),
                    CoordinatorEvent::UpdateFailed => {
                        warn!("refresh failed, sensors unavailable until the retry succeeds")
                    }
                }
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    watcher.abort();
    registry.unload_entry(&entry_id).await?;
    Ok(())
}

fn log_times(
    coordinator: &std::sync::Arc<salat_coordinator::PrayerTimesCoordinator>,
    entry_id: &str,
) {
    let Some(data) = coordinator.data() else {
        return;
    };
    info!(hijri_date = %data.hijri_date, "today's prayer times");
    for sensor in sensors_for_entry(coordinator, entry_id) {
        if let Some(instant) = sensor.native_value() {
            info!("  {:<9} {}", sensor.name(), instant.to_rfc3339());
        }
    }
}
