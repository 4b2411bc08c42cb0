use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{AppState, MealEntry};
use crate::totals::Totals;

/// Progress bars stop growing at this percentage.
pub const PROGRESS_CAP_PCT: f64 = 150.0;

/// Percentage of `target` reached, capped at 150. A missing or zero target
/// yields 0.
#[must_use]
pub fn progress_percent(current: f64, target: Option<f64>) -> f64 {
    match target {
        Some(t) if t != 0.0 => (current / t * 100.0).min(PROGRESS_CAP_PCT),
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressBar {
    pub nutrient: &'static str,
    pub unit: &'static str,
    pub current: f64,
    pub target: Option<f64>,
    pub percent: f64,
    pub label: String,
}

impl ProgressBar {
    #[must_use]
    pub fn new(
        nutrient: &'static str,
        unit: &'static str,
        current: f64,
        target: Option<f64>,
    ) -> Self {
        let target = target.filter(|t| *t != 0.0);
        let label = match target {
            Some(t) => format!("{current} / {:.0} {unit}", t.round()),
            None => format!("{current} / – {unit}"),
        };
        Self {
            nutrient,
            unit,
            current,
            target,
            percent: progress_percent(current, target),
            label,
        }
    }
}

/// Snapshot of the active day for display.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub meals: Vec<MealEntry>,
    pub totals: Totals,
    pub progress: Vec<ProgressBar>,
    pub rmr: Option<f64>,
    pub tdee: Option<f64>,
    pub goal_calories: Option<f64>,
}

impl DailySummary {
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let totals = state.totals();
        Self {
            date: state.last_active_date,
            meals: state.meals.clone(),
            totals,
            progress: progress_bars(state, &totals),
            rmr: state.rmr,
            tdee: state.tdee,
            goal_calories: state.goal_calories,
        }
    }
}

/// The calorie bar tracks the calorie goal; macro bars track their gram targets.
#[must_use]
pub fn progress_bars(state: &AppState, totals: &Totals) -> Vec<ProgressBar> {
    let targets = &state.macro_targets;
    vec![
        ProgressBar::new("calories", "kcal", totals.kcal, state.goal_calories),
        ProgressBar::new("protein", "g", totals.protein, targets.protein),
        ProgressBar::new("carbs", "g", totals.carbs, targets.carbs),
        ProgressBar::new("fat", "g", totals.fat, targets.fat),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MacroTargets, NutrientRecord};

    #[test]
    fn test_progress_clamps_at_150() {
        assert!((progress_percent(3100.0, Some(2000.0)) - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_normal() {
        assert!((progress_percent(1000.0, Some(2000.0)) - 50.0).abs() < 1e-9);
        assert!((progress_percent(2000.0, Some(2000.0)) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_without_target() {
        assert!(progress_percent(500.0, None).abs() < f64::EPSILON);
        assert!(progress_percent(500.0, Some(0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bar_labels() {
        let bar = ProgressBar::new("protein", "g", 42.5, Some(149.6));
        assert_eq!(bar.label, "42.5 / 150 g");

        let bar = ProgressBar::new("fat", "g", 12.0, None);
        assert_eq!(bar.label, "12 / – g");
        assert!(bar.percent.abs() < f64::EPSILON);

        let bar = ProgressBar::new("carbs", "g", 12.0, Some(0.0));
        assert_eq!(bar.label, "12 / – g");
        assert!(bar.target.is_none());
    }

    #[test]
    fn test_summary_uses_goal_calories_for_kcal_bar() {
        let mut state = AppState::fresh(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        state.goal_calories = Some(2000.0);
        state.macro_targets = MacroTargets {
            kcal: Some(9999.0),
            protein: Some(100.0),
            carbs: None,
            fat: None,
        };
        state.meals.push(MealEntry::new(
            "Pizza",
            NutrientRecord::new(3100.0, 120.0, 300.0, 150.0).unwrap(),
        ));

        let summary = DailySummary::from_state(&state);
        assert!((summary.totals.kcal - 3100.0).abs() < 1e-9);
        assert_eq!(summary.progress.len(), 4);
        assert_eq!(summary.progress[0].nutrient, "calories");
        assert!((summary.progress[0].percent - 150.0).abs() < f64::EPSILON);
        assert_eq!(summary.progress[0].label, "3100 / 2000 kcal");
        assert!((summary.progress[1].percent - 120.0).abs() < 1e-9);
        assert!(summary.progress[2].percent.abs() < f64::EPSILON);
    }
}
