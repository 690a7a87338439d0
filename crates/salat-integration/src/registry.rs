//! Instance registry
//!
//! Maps entry ids to their coordinator instances and drives the
//! setup / options-updated / unload lifecycle. Each entry owns its own
//! coordinator and cache; nothing is shared across instances.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use salat_coordinator::PrayerTimesCoordinator;

use crate::entry::PrayerEntry;
use crate::error::{SetupError, SetupResult};
use crate::options::PrayerOptions;

/// Integration domain name
pub const DOMAIN: &str = "islamic_prayer_times";

/// Registry of configured entries and their running coordinators
pub struct IslamicPrayerTimes {
    entries: DashMap<String, PrayerEntry>,
    coordinators: DashMap<String, Arc<PrayerTimesCoordinator>>,
    /// Serializes lifecycle operations
    setup_lock: Mutex<()>,
}

impl IslamicPrayerTimes {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            coordinators: DashMap::new(),
            setup_lock: Mutex::new(()),
        }
    }

    /// Set up an entry: validate options, start its coordinator, block
    /// until the first refresh resolves
    ///
    /// On a failed first refresh the coordinator is torn down and the
    /// error surfaces to the caller; nothing stays registered.
    pub async fn setup_entry(
        &self,
        entry: PrayerEntry,
    ) -> SetupResult<Arc<PrayerTimesCoordinator>> {
        let _lock = self.setup_lock.lock().await;

        if self.entries.contains_key(&entry.entry_id) {
            return Err(SetupError::AlreadySetUp(entry.entry_id));
        }

        let config = entry.options.coordinator_config()?;
        let coordinator = PrayerTimesCoordinator::new(config);
        if let Err(err) = coordinator.first_refresh().await {
            coordinator.shutdown();
            return Err(err.into());
        }

        info!(
            domain = DOMAIN,
            entry_id = %entry.entry_id,
            title = %entry.title,
            "entry set up"
        );
        self.coordinators
            .insert(entry.entry_id.clone(), Arc::clone(&coordinator));
        self.entries.insert(entry.entry_id.clone(), entry);
        Ok(coordinator)
    }

    /// Apply updated options to a registered entry
    ///
    /// The old coordinator (and its pending trigger) is shut down and a
    /// fresh one starts computing immediately. A failing refresh here is
    /// not a setup error: the new coordinator keeps retrying and its
    /// consumers read as unavailable meanwhile.
    pub async fn options_updated(
        &self,
        entry_id: &str,
        options: PrayerOptions,
    ) -> SetupResult<Arc<PrayerTimesCoordinator>> {
        let _lock = self.setup_lock.lock().await;

        if !self.entries.contains_key(entry_id) {
            return Err(SetupError::NotFound(entry_id.to_string()));
        }
        let config = options.coordinator_config()?;

        if let Some((_, previous)) = self.coordinators.remove(entry_id) {
            previous.shutdown();
        }

        let coordinator = PrayerTimesCoordinator::new(config);
        coordinator.request_refresh().await;
        if !coordinator.last_update_success() {
            warn!(entry_id = %entry_id, "refresh after options update failed, retrying");
        }

        // Map guards are never held across an await; the setup lock keeps
        // the entry registered between the check above and this write.
        if let Some(mut entry) = self.entries.get_mut(entry_id) {
            entry.options = options;
        }
        self.coordinators
            .insert(entry_id.to_string(), Arc::clone(&coordinator));
        info!(domain = DOMAIN, entry_id = %entry_id, "entry options updated");
        Ok(coordinator)
    }

    /// Unload an entry: cancel its timers and drop it from the registry
    pub async fn unload_entry(&self, entry_id: &str) -> SetupResult<PrayerEntry> {
        let _lock = self.setup_lock.lock().await;

        let (_, entry) = self
            .entries
            .remove(entry_id)
            .ok_or_else(|| SetupError::NotFound(entry_id.to_string()))?;
        if let Some((_, coordinator)) = self.coordinators.remove(entry_id) {
            coordinator.shutdown();
        }

        info!(domain = DOMAIN, entry_id = %entry_id, "entry unloaded");
        Ok(entry)
    }

    /// The running coordinator of an entry
    pub fn coordinator(&self, entry_id: &str) -> Option<Arc<PrayerTimesCoordinator>> {
        self.coordinators.get(entry_id).map(|c| Arc::clone(c.value()))
    }

    /// A registered entry by id
    pub fn get(&self, entry_id: &str) -> Option<PrayerEntry> {
        self.entries.get(entry_id).map(|e| e.value().clone())
    }

    /// Ids of all registered entries
    pub fn entry_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for IslamicPrayerTimes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salat_calc::Prayer;

    #[tokio::test]
    async fn test_setup_and_unload() {
        let registry = IslamicPrayerTimes::new();
        let entry = PrayerEntry::new("Alexandria", PrayerOptions::default());
        let entry_id = entry.entry_id.clone();

        let coordinator = registry.setup_entry(entry).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert!(coordinator.data().is_some());
        assert!(registry.coordinator(&entry_id).is_some());

        let unloaded = registry.unload_entry(&entry_id).await.unwrap();
        assert_eq!(unloaded.entry_id, entry_id);
        assert!(registry.is_empty());
        assert!(registry.coordinator(&entry_id).is_none());
        // Teardown cancelled the pending daily trigger.
        assert!(coordinator.next_refresh_at().is_none());
    }

    #[tokio::test]
    async fn test_setup_rejects_bad_coordinates() {
        let registry = IslamicPrayerTimes::new();
        let entry = PrayerEntry::new(
            "Nowhere",
            PrayerOptions {
                longitude: 200.0,
                ..PrayerOptions::default()
            },
        );

        let result = registry.setup_entry(entry).await;
        assert!(matches!(result, Err(SetupError::InvalidLocation(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_setup_rejected() {
        let registry = IslamicPrayerTimes::new();
        let entry = PrayerEntry::new("Alexandria", PrayerOptions::default());
        let duplicate = entry.clone();

        registry.setup_entry(entry).await.unwrap();
        assert!(matches!(
            registry.setup_entry(duplicate).await,
            Err(SetupError::AlreadySetUp(_))
        ));
    }

    #[tokio::test]
    async fn test_options_updated_replaces_coordinator() {
        let registry = IslamicPrayerTimes::new();
        let entry = PrayerEntry::new("Alexandria", PrayerOptions::default());
        let entry_id = entry.entry_id.clone();

        let old = registry.setup_entry(entry).await.unwrap();
        let old_asr = old.data().unwrap().get(Prayer::Asr).unwrap();

        let new = registry
            .options_updated(
                &entry_id,
                PrayerOptions {
                    school: salat_calc::AsrSchool::Hanafi,
                    ..PrayerOptions::default()
                },
            )
            .await
            .unwrap();

        // The old instance is torn down; the Hanafi Asr is later.
        assert!(old.next_refresh_at().is_none());
        let new_asr = new.data().unwrap().get(Prayer::Asr).unwrap();
        assert!(new_asr > old_asr);
        assert_eq!(
            registry.get(&entry_id).unwrap().options.school,
            salat_calc::AsrSchool::Hanafi
        );
        registry.unload_entry(&entry_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_registry_readable_while_options_update_in_flight() {
        // Readers scheduled onto the same thread must not block on a map
        // shard while an options update awaits its recomputation.
        let registry = Arc::new(IslamicPrayerTimes::new());
        let entry = PrayerEntry::new("Alexandria", PrayerOptions::default());
        let entry_id = entry.entry_id.clone();
        registry.setup_entry(entry).await.unwrap();

        let reader = {
            let registry = Arc::clone(&registry);
            let entry_id = entry_id.clone();
            tokio::spawn(async move {
                assert!(registry.get(&entry_id).is_some());
                registry.entry_ids().len()
            })
        };

        registry
            .options_updated(&entry_id, PrayerOptions::default())
            .await
            .unwrap();
        assert_eq!(reader.await.unwrap(), 1);
        registry.unload_entry(&entry_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_unload_unknown_entry() {
        let registry = IslamicPrayerTimes::new();
        assert!(matches!(
            registry.unload_entry("missing").await,
            Err(SetupError::NotFound(_))
        ));
    }
}
