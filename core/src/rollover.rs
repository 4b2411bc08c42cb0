//! Daily rollover: moving the active day's meals into history.
//!
//! The active day is compared to "today" by calendar date only. Rollover on
//! load happens once per process start; a day that ends while the tracker is
//! running is only archived on the next load or on a manual close.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::models::{AppState, ArchiveReason, DayRecord};
use crate::storage::KeyValueStore;
use crate::store::StateStore;

#[derive(Debug, Clone, PartialEq)]
pub enum RolloverOutcome {
    /// Nothing changed.
    Unchanged,
    /// Meals were archived into this record, now `history[0]`.
    Archived(DayRecord),
    /// No meals to archive, but the active day was moved to today.
    DateRefreshed,
}

/// Prepend the active day's aggregate to history and clear the meals.
/// Empty days are not recorded.
pub fn archive_meals(state: &mut AppState, reason: ArchiveReason) -> Option<DayRecord> {
    if state.meals.is_empty() {
        return None;
    }
    let record = DayRecord {
        date: state.last_active_date,
        totals: state.totals(),
        reason,
        meal_count: state.meals.len(),
    };
    state.history.insert(0, record.clone());
    state.meals.clear();
    Some(record)
}

pub fn rollover_on_load(state: &mut AppState, today: NaiveDate) -> RolloverOutcome {
    if state.last_active_date == today || state.meals.is_empty() {
        return RolloverOutcome::Unchanged;
    }
    match archive_meals(state, ArchiveReason::AutoRollover) {
        Some(record) => {
            state.last_active_date = today;
            RolloverOutcome::Archived(record)
        }
        None => RolloverOutcome::Unchanged,
    }
}

pub fn close_day(state: &mut AppState, today: NaiveDate) -> RolloverOutcome {
    let archived = archive_meals(state, ArchiveReason::ManualClear);
    state.last_active_date = today;
    match archived {
        Some(record) => RolloverOutcome::Archived(record),
        None => RolloverOutcome::DateRefreshed,
    }
}

impl<S: KeyValueStore> StateStore<S> {
    /// Archive a stale day left over from a previous session. Persists only
    /// when something was archived.
    pub fn check_and_rollover_on_load(&mut self, today: NaiveDate) -> Result<RolloverOutcome> {
        let outcome = rollover_on_load(self.state_mut(), today);
        if let RolloverOutcome::Archived(record) = &outcome {
            info!(
                date = %record.date,
                meals = record.meal_count,
                kcal = record.totals.kcal,
                "rolled over previous day"
            );
            self.persist()?;
        }
        Ok(outcome)
    }

    pub fn close_day_manually(&mut self, today: NaiveDate) -> Result<RolloverOutcome> {
        let outcome = close_day(self.state_mut(), today);
        if let RolloverOutcome::Archived(record) = &outcome {
            info!(
                date = %record.date,
                meals = record.meal_count,
                kcal = record.totals.kcal,
                "closed day"
            );
        }
        self.persist()?;
        Ok(outcome)
    }
}
