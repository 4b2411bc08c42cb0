use anyhow::Result;
use chrono::NaiveDate;
use std::process;

use macrolog_core::models::{MealEntry, NutrientRecord};
use macrolog_core::storage::KeyValueStore;
use macrolog_core::store::StateStore;

use super::helpers::{display_to_index, json_error, print_meal_table};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_add<S: KeyValueStore>(
    store: &mut StateStore<S>,
    name: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let nutrients = NutrientRecord::new(calories, protein, carbs, fat)?;
    let entry = MealEntry::new(name, nutrients);

    store.add_meal(entry.clone(), today);
    store.persist()?;

    let number = store.state().meals.len();
    let totals = store.state().totals();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "number": number,
                "entry": entry,
                "totals": totals,
            }))?
        );
    } else {
        let name = if entry.name.is_empty() { "(unnamed)" } else { &entry.name };
        println!(
            "Logged #{number} {name} — {calories:.0} kcal | P:{protein:.0}g C:{carbs:.0}g F:{fat:.0}g"
        );
        let kcal = totals.kcal;
        println!("Today so far: {kcal:.0} kcal");
    }

    Ok(())
}

pub(crate) fn cmd_list<S: KeyValueStore>(store: &StateStore<S>, json: bool) -> Result<()> {
    let meals = &store.state().meals;

    if json {
        println!("{}", serde_json::to_string_pretty(meals)?);
        return Ok(());
    }

    if meals.is_empty() {
        eprintln!("No foods logged yet.");
        process::exit(2);
    }

    print_meal_table(meals);
    Ok(())
}

/// Delete by the 1-based number shown in `list`. A number that no longer
/// matches an entry leaves the log untouched.
pub(crate) fn cmd_delete<S: KeyValueStore>(
    store: &mut StateStore<S>,
    number: usize,
    json: bool,
) -> Result<()> {
    let removed = display_to_index(number).and_then(|index| store.remove_meal_at(index));

    if let Some(entry) = removed {
        store.persist()?;
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "deleted": number,
                    "entry": entry,
                }))?
            );
        } else {
            let name = &entry.name;
            println!("Deleted #{number} {name}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Entry #{number} not found")));
        } else {
            eprintln!("Entry #{number} not found");
        }
        process::exit(2);
    }
}
