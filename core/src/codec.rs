//! JSON document format for the persisted state.
//!
//! Writing is strict and always emits the current layout. Reading is tolerant:
//! every field is decoded on its own and falls back to its default when it is
//! missing or malformed, so older or partially written documents still load.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{
    ActivityLevel, AppState, ArchiveReason, DayRecord, MAX_AMOUNT, MacroSplitInputs, MacroTargets,
    MealEntry, NutrientRecord, ProfileInputs, Sex,
};
use crate::totals::Totals;

pub const FORMAT_VERSION: u64 = 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument<'a> {
    version: u64,
    rmr: Option<f64>,
    tdee: Option<f64>,
    goal_calories: Option<f64>,
    macro_targets: &'a MacroTargets,
    meals: &'a [MealEntry],
    history: &'a [DayRecord],
    last_date: NaiveDate,
    profile: &'a ProfileInputs,
    macros_pct: &'a MacroSplitInputs,
}

pub fn encode(state: &AppState) -> Result<String> {
    let doc = StoredDocument {
        version: FORMAT_VERSION,
        rmr: state.rmr,
        tdee: state.tdee,
        goal_calories: state.goal_calories,
        macro_targets: &state.macro_targets,
        meals: &state.meals,
        history: &state.history,
        last_date: state.last_active_date,
        profile: &state.profile,
        macros_pct: &state.macro_split,
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decode a stored document. Never fails: anything unreadable becomes a default.
#[must_use]
pub fn decode(raw: &str, today: NaiveDate) -> AppState {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "stored state is not valid JSON, starting fresh");
            return AppState::fresh(today);
        }
    };
    let Some(obj) = value.as_object() else {
        warn!("stored state is not a JSON object, starting fresh");
        return AppState::fresh(today);
    };

    let version = obj.get("version").and_then(Value::as_u64).unwrap_or(1);
    if version > FORMAT_VERSION {
        warn!(version, "stored state has a newer format version, reading best-effort");
    }

    let last_active_date = obj
        .get("lastDate")
        .or_else(|| obj.get("lastActiveDate"))
        .and_then(parse_date)
        .unwrap_or(today);

    AppState {
        rmr: number(obj.get("rmr")),
        tdee: number(obj.get("tdee")),
        goal_calories: number(obj.get("goalCalories")),
        macro_targets: obj
            .get("macroTargets")
            .and_then(Value::as_object)
            .map(decode_macro_targets)
            .unwrap_or_default(),
        meals: decode_list(obj.get("meals"), "meals", decode_meal),
        history: decode_list(obj.get("history"), "history", decode_day),
        last_active_date,
        profile: obj
            .get("profile")
            .and_then(Value::as_object)
            .map(decode_profile)
            .unwrap_or_default(),
        macro_split: obj
            .get("macrosPct")
            .and_then(Value::as_object)
            .map(decode_macro_split)
            .unwrap_or_default(),
    }
}

fn decode_list<T>(value: Option<&Value>, field: &str, f: fn(&Value) -> Option<T>) -> Vec<T> {
    let Some(items) = value.and_then(Value::as_array) else {
        if value.is_some_and(|v| !v.is_null()) {
            warn!(field, "stored field is not a list, using empty list");
        }
        return Vec::new();
    };
    let decoded: Vec<T> = items.iter().filter_map(f).collect();
    if decoded.len() < items.len() {
        warn!(
            field,
            dropped = items.len() - decoded.len(),
            "dropped malformed stored entries"
        );
    }
    decoded
}

fn decode_meal(value: &Value) -> Option<MealEntry> {
    let obj = value.as_object()?;
    let name = match obj.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let field = |key: &str| {
        let v = amount(obj.get(key));
        if v > MAX_AMOUNT { 0.0 } else { v }
    };
    Some(MealEntry {
        name,
        nutrients: NutrientRecord {
            calories: field("calories"),
            protein: field("protein"),
            carbs: field("carbs"),
            fat: field("fat"),
        },
    })
}

fn decode_day(value: &Value) -> Option<DayRecord> {
    let obj = value.as_object()?;
    let date = obj.get("date").and_then(parse_date)?;
    let reason = obj
        .get("reason")
        .and_then(Value::as_str)
        .and_then(ArchiveReason::parse)?;
    let totals = obj
        .get("totals")
        .and_then(Value::as_object)
        .map(|t| Totals {
            kcal: amount(t.get("kcal").or_else(|| t.get("calories"))),
            protein: amount(t.get("protein")),
            carbs: amount(t.get("carbs")),
            fat: amount(t.get("fat")),
        })
        .unwrap_or_default();
    let meal_count = number(obj.get("mealCount"))
        .filter(|n| *n >= 0.0)
        .map_or(0, |n| n as usize);
    Some(DayRecord {
        date,
        totals,
        reason,
        meal_count,
    })
}

fn decode_macro_targets(obj: &Map<String, Value>) -> MacroTargets {
    MacroTargets {
        kcal: number(obj.get("kcal")),
        protein: number(obj.get("protein")),
        carbs: number(obj.get("carbs")),
        fat: number(obj.get("fat")),
    }
}

fn decode_profile(obj: &Map<String, Value>) -> ProfileInputs {
    ProfileInputs {
        gender: obj.get("gender").and_then(Value::as_str).and_then(Sex::parse),
        age: positive(obj.get("age")),
        weight: positive(obj.get("weight")),
        height: positive(obj.get("height")),
        activity: obj
            .get("activity")
            .and_then(Value::as_str)
            .and_then(ActivityLevel::parse),
    }
}

fn decode_macro_split(obj: &Map<String, Value>) -> MacroSplitInputs {
    let pct = |key: &str| {
        number(obj.get(key))
            .filter(|n| (0.0..=100.0).contains(n))
            .map(|n| n.round() as i64)
    };
    MacroSplitInputs {
        protein: pct("protein"),
        carbs: pct("carbs"),
        fat: pct("fat"),
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.as_str()?.trim(), DATE_FORMAT).ok()
}

/// A finite number, given either as a JSON number or as numeric text.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn positive(value: Option<&Value>) -> Option<f64> {
    number(value).filter(|n| *n > 0.0)
}

/// Nutrient quantities default to zero, matching how blank form fields were logged.
fn amount(value: Option<&Value>) -> f64 {
    number(value).filter(|n| *n >= 0.0).unwrap_or(0.0)
}
