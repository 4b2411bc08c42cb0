use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::codec;
use crate::energy;
use crate::models::{AppState, MacroSplitInputs, MacroTargets, MealEntry, ProfileInputs};
use crate::storage::KeyValueStore;

/// Fixed key of the single durable slot holding the whole state document.
pub const STORAGE_KEY: &str = "nutritionAppState_v1";

/// Owns the application state and the backend it round-trips through.
///
/// Mutators only change the in-memory state; callers follow each user action
/// with [`StateStore::persist`]. A failed write leaves the in-memory change in
/// place and is returned for the caller to report.
pub struct StateStore<S: KeyValueStore> {
    backend: S,
    state: AppState,
}

impl<S: KeyValueStore> StateStore<S> {
    /// Load state from `backend`, or start fresh when the slot is empty.
    /// Only backend read failures are errors; a malformed document is not.
    pub fn initialize(backend: S, today: NaiveDate) -> Result<Self> {
        let raw = backend
            .get(STORAGE_KEY)
            .context("Failed to read stored state")?;
        let state = match raw {
            Some(raw) => {
                debug!(bytes = raw.len(), "loaded stored state");
                codec::decode(&raw, today)
            }
            None => {
                debug!("no stored state, starting fresh");
                AppState::fresh(today)
            }
        };
        Ok(Self { backend, state })
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &S {
        &self.backend
    }

    #[cfg(test)]
    pub(crate) fn into_backend(self) -> S {
        self.backend
    }

    /// Overwrite the durable slot with the full current state.
    pub fn persist(&mut self) -> Result<()> {
        let raw = codec::encode(&self.state)?;
        if let Err(e) = self.backend.set(STORAGE_KEY, &raw) {
            warn!(error = %e, "failed to save state");
            return Err(e.context("Failed to save state"));
        }
        debug!(bytes = raw.len(), "persisted state");
        Ok(())
    }

    /// Erase the durable slot and start over with a fresh state for `today`.
    pub fn reset(&mut self, today: NaiveDate) -> Result<()> {
        self.state = AppState::fresh(today);
        self.backend
            .remove(STORAGE_KEY)
            .context("Failed to erase stored state")?;
        debug!("stored state erased");
        Ok(())
    }

    /// Log a food for `today`. An empty log adopts `today` as the active day,
    /// so the entry is never archived under an earlier date.
    pub fn add_meal(&mut self, entry: MealEntry, today: NaiveDate) {
        if self.state.meals.is_empty() && self.state.last_active_date != today {
            debug!(from = %self.state.last_active_date, to = %today, "moving empty day to today");
            self.state.last_active_date = today;
        }
        self.state.meals.push(entry);
    }

    /// Remove the meal at `index`. An out-of-range index is ignored and
    /// returns `None`, since UI indices may be stale.
    pub fn remove_meal_at(&mut self, index: usize) -> Option<MealEntry> {
        if index >= self.state.meals.len() {
            debug!(index, len = self.state.meals.len(), "ignoring stale meal index");
            return None;
        }
        Some(self.state.meals.remove(index))
    }

    /// Store new body metrics and recompute RMR/TDEE from them. Both are
    /// cleared when the profile is too incomplete to estimate.
    pub fn update_profile(&mut self, profile: ProfileInputs) {
        self.state.profile = profile;
        self.state.rmr = energy::resting_metabolic_rate(&profile);
        self.state.tdee = self
            .state
            .rmr
            .zip(profile.activity)
            .map(|(rmr, activity)| energy::total_daily_energy(rmr, activity));
    }

    /// Set the calorie goal and, when given, the macro split; macro gram
    /// targets are derived from both.
    pub fn set_goal(&mut self, goal_calories: f64, split: MacroSplitInputs) -> Result<()> {
        let targets = energy::macro_targets(goal_calories, &split)?;
        self.state.goal_calories = Some(goal_calories);
        self.state.macro_split = split;
        self.state.macro_targets = targets;
        Ok(())
    }

    pub fn clear_targets(&mut self) {
        self.state.goal_calories = None;
        self.state.macro_targets = MacroTargets::default();
        self.state.macro_split = MacroSplitInputs::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, NutrientRecord, Sex};
    use crate::storage::{FullStore, MemoryStore, SqliteStore};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn egg() -> MealEntry {
        MealEntry::new("Egg", NutrientRecord::new(70.0, 6.0, 1.0, 5.0).unwrap())
    }

    fn toast() -> MealEntry {
        MealEntry::new("Toast", NutrientRecord::new(80.0, 3.0, 14.0, 1.0).unwrap())
    }

    #[test]
    fn test_initialize_fresh() {
        let today = date("2024-06-15");
        let store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        assert_eq!(store.state(), &AppState::fresh(today));
        assert!(store.backend().get(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_add_meal_is_in_memory_until_persist() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.add_meal(egg(), today);
        assert_eq!(store.state().meals.len(), 1);
        assert!(store.backend().get(STORAGE_KEY).unwrap().is_none());

        store.persist().unwrap();
        let raw = store.backend().get(STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"Egg\""));
    }

    #[test]
    fn test_add_meal_moves_empty_day_to_today() {
        let mut store = StateStore::initialize(MemoryStore::new(), date("2024-01-01")).unwrap();
        store.add_meal(egg(), date("2024-01-05"));
        assert_eq!(store.state().last_active_date, date("2024-01-05"));

        store.add_meal(toast(), date("2024-01-06"));
        assert_eq!(store.state().last_active_date, date("2024-01-05"));
        assert_eq!(store.state().meals, vec![egg(), toast()]);
    }

    #[test]
    fn test_round_trip_through_backend() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.add_meal(egg(), today);
        store.add_meal(toast(), today);
        store
            .set_goal(
                2000.0,
                MacroSplitInputs {
                    protein: Some(30),
                    carbs: Some(40),
                    fat: Some(30),
                },
            )
            .unwrap();
        store.persist().unwrap();
        let before = store.state().clone();

        let reloaded = StateStore::initialize(store.into_backend(), today).unwrap();
        assert_eq!(reloaded.state().meals, before.meals);
        assert_eq!(reloaded.state().history, before.history);
        assert_eq!(reloaded.state().macro_targets, before.macro_targets);
        assert_eq!(reloaded.state().last_active_date, before.last_active_date);
        assert_eq!(reloaded.state().totals(), before.totals());
    }

    #[test]
    fn test_round_trip_through_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macrolog.db");
        let today = date("2024-06-15");

        {
            let backend = SqliteStore::open(&path).unwrap();
            let mut store = StateStore::initialize(backend, today).unwrap();
            store.add_meal(egg(), today);
            store.persist().unwrap();
        }

        let backend = SqliteStore::open(&path).unwrap();
        let store = StateStore::initialize(backend, today).unwrap();
        assert_eq!(store.state().meals, vec![egg()]);
    }

    #[test]
    fn test_remove_meal_at() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.add_meal(egg(), today);
        store.add_meal(toast(), today);

        let removed = store.remove_meal_at(0);
        assert_eq!(removed, Some(egg()));
        assert_eq!(store.state().meals, vec![toast()]);
    }

    #[test]
    fn test_remove_meal_at_out_of_range_is_noop() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.add_meal(egg(), today);
        store.add_meal(toast(), today);

        assert!(store.remove_meal_at(5).is_none());
        assert!(store.remove_meal_at(2).is_none());
        assert_eq!(store.state().meals, vec![egg(), toast()]);
    }

    #[test]
    fn test_reset_erases_slot() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.add_meal(egg(), today);
        store.persist().unwrap();

        let tomorrow = date("2024-06-16");
        store.reset(tomorrow).unwrap();
        assert!(store.backend().get(STORAGE_KEY).unwrap().is_none());
        assert_eq!(store.state(), &AppState::fresh(tomorrow));
    }

    #[test]
    fn test_initialize_tolerates_garbage() {
        let today = date("2024-06-15");
        let mut backend = MemoryStore::new();
        backend.set(STORAGE_KEY, "{\"meals\": 12, \"lastDate\": 5").unwrap();
        let store = StateStore::initialize(backend, today).unwrap();
        assert_eq!(store.state(), &AppState::fresh(today));
    }

    #[test]
    fn test_failed_write_keeps_mutation() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(FullStore, today).unwrap();
        store.add_meal(egg(), today);
        let err = store.persist().unwrap_err();
        assert!(format!("{err:#}").contains("quota exceeded"));
        assert_eq!(store.state().meals, vec![egg()]);
    }

    #[test]
    fn test_update_profile_computes_energy() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.update_profile(ProfileInputs {
            gender: Some(Sex::Male),
            age: Some(30.0),
            weight: Some(80.0),
            height: Some(180.0),
            activity: Some(ActivityLevel::Sedentary),
        });
        // 800 + 1125 - 150 + 5
        let rmr = store.state().rmr.unwrap();
        assert!((rmr - 1780.0).abs() < 1e-9);
        let tdee = store.state().tdee.unwrap();
        assert!((tdee - 2136.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_profile_incomplete_clears_energy() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.state_mut().rmr = Some(1500.0);
        store.state_mut().tdee = Some(1800.0);
        store.update_profile(ProfileInputs {
            gender: Some(Sex::Female),
            age: None,
            weight: Some(60.0),
            height: Some(165.0),
            activity: Some(ActivityLevel::Sedentary),
        });
        assert!(store.state().rmr.is_none());
        assert!(store.state().tdee.is_none());
    }

    #[test]
    fn test_update_profile_without_activity_keeps_rmr_only() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.update_profile(ProfileInputs {
            gender: Some(Sex::Female),
            age: Some(25.0),
            weight: Some(60.0),
            height: Some(165.0),
            activity: None,
        });
        assert!(store.state().rmr.is_some());
        assert!(store.state().tdee.is_none());
    }

    #[test]
    fn test_set_goal_rejects_bad_split() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        let result = store.set_goal(
            2000.0,
            MacroSplitInputs {
                protein: Some(50),
                carbs: Some(50),
                fat: Some(50),
            },
        );
        assert!(result.is_err());
        assert!(store.state().goal_calories.is_none());
        assert_eq!(store.state().macro_split, MacroSplitInputs::default());
    }

    #[test]
    fn test_clear_targets() {
        let today = date("2024-06-15");
        let mut store = StateStore::initialize(MemoryStore::new(), today).unwrap();
        store.set_goal(1800.0, MacroSplitInputs::default()).unwrap();
        assert_eq!(store.state().macro_targets.kcal, Some(1800.0));

        store.clear_targets();
        assert!(store.state().goal_calories.is_none());
        assert_eq!(store.state().macro_targets, MacroTargets::default());
    }
}
