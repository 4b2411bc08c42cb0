use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::totals::{Totals, aggregate_meals};

/// Largest amount accepted for a single nutrient of one entry.
pub const MAX_AMOUNT: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientRecord {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutrientRecord {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Result<Self> {
        for (label, value) in [
            ("Calories", calories),
            ("Protein", protein),
            ("Carbs", carbs),
            ("Fat", fat),
        ] {
            if !value.is_finite() {
                bail!("{label} must be a number");
            }
            if value < 0.0 {
                bail!("{label} must be non-negative");
            }
            if value > MAX_AMOUNT {
                bail!("{label} must be at most {MAX_AMOUNT}");
            }
        }
        Ok(Self {
            calories,
            protein,
            carbs,
            fat,
        })
    }
}

/// A food logged against the active day. Entries carry no identifier; they
/// are addressed by their position in `AppState::meals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub name: String,
    #[serde(flatten)]
    pub nutrients: NutrientRecord,
}

impl MealEntry {
    pub fn new(name: &str, nutrients: NutrientRecord) -> Self {
        Self {
            name: name.trim().to_string(),
            nutrients,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveReason {
    AutoRollover,
    ManualClear,
}

impl ArchiveReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveReason::AutoRollover => "auto-rollover",
            ArchiveReason::ManualClear => "manual-clear",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto-rollover" => Some(ArchiveReason::AutoRollover),
            "manual-clear" => Some(ArchiveReason::ManualClear),
            _ => None,
        }
    }
}

/// A finalized day. Totals are frozen at archive time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    pub totals: Totals,
    pub reason: ArchiveReason,
    pub meal_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroTargets {
    pub kcal: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Sex::Male),
            "female" | "f" => Some(Sex::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" | "lightly_active" => Some(ActivityLevel::LightlyActive),
            "moderate" | "moderately_active" => Some(ActivityLevel::ModeratelyActive),
            "very" | "very_active" => Some(ActivityLevel::VeryActive),
            "extra" | "extra_active" => Some(ActivityLevel::ExtraActive),
            _ => None,
        }
    }

    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

/// Body metrics used to estimate energy expenditure. Weight is in kg, height in cm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileInputs {
    pub gender: Option<Sex>,
    pub age: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub activity: Option<ActivityLevel>,
}

/// Macro split as whole percentages of goal calories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MacroSplitInputs {
    pub protein: Option<i64>,
    pub carbs: Option<i64>,
    pub fat: Option<i64>,
}

pub fn validate_macro_split(protein: i64, carbs: i64, fat: i64) -> Result<()> {
    if protein < 0 || carbs < 0 || fat < 0 {
        bail!("Macro percentages must be non-negative");
    }
    if protein > 100 || carbs > 100 || fat > 100 {
        bail!("Each macro percentage must be between 0 and 100");
    }
    let sum = protein + carbs + fat;
    if sum != 100 {
        bail!("Macro percentages must sum to 100 (got {sum})");
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub rmr: Option<f64>,
    pub tdee: Option<f64>,
    pub goal_calories: Option<f64>,
    pub macro_targets: MacroTargets,
    pub meals: Vec<MealEntry>,
    /// Newest first, in insertion order.
    pub history: Vec<DayRecord>,
    pub last_active_date: NaiveDate,
    pub profile: ProfileInputs,
    pub macro_split: MacroSplitInputs,
}

impl AppState {
    #[must_use]
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            rmr: None,
            tdee: None,
            goal_calories: None,
            macro_targets: MacroTargets::default(),
            meals: Vec::new(),
            history: Vec::new(),
            last_active_date: today,
            profile: ProfileInputs::default(),
            macro_split: MacroSplitInputs::default(),
        }
    }

    /// Running totals for the active day, always derived from `meals`.
    #[must_use]
    pub fn totals(&self) -> Totals {
        aggregate_meals(&self.meals)
    }
}
