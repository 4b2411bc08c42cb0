use anyhow::{Result, bail};

use macrolog_core::models::{MacroSplitInputs, MacroTargets};
use macrolog_core::storage::KeyValueStore;
use macrolog_core::store::StateStore;

pub(crate) fn cmd_target_set<S: KeyValueStore>(
    store: &mut StateStore<S>,
    calories: f64,
    protein: Option<i64>,
    carbs: Option<i64>,
    fat: Option<i64>,
    json: bool,
) -> Result<()> {
    if calories <= 0.0 {
        bail!("Calorie target must be greater than 0");
    }

    let split = MacroSplitInputs {
        protein,
        carbs,
        fat,
    };
    store.set_goal(calories, split)?;
    store.persist()?;

    print_targets(
        store.state().goal_calories,
        &store.state().macro_targets,
        &store.state().macro_split,
        json,
    )
}

pub(crate) fn cmd_target_show<S: KeyValueStore>(store: &StateStore<S>, json: bool) -> Result<()> {
    let state = store.state();
    if state.goal_calories.is_none() && !json {
        eprintln!("No targets set. Use `macrolog target set <calories>` to set one.");
        return Ok(());
    }
    print_targets(
        state.goal_calories,
        &state.macro_targets,
        &state.macro_split,
        json,
    )
}

pub(crate) fn cmd_target_clear<S: KeyValueStore>(
    store: &mut StateStore<S>,
    json: bool,
) -> Result<()> {
    let cleared = store.state().goal_calories.is_some()
        || store.state().macro_targets != MacroTargets::default();
    store.clear_targets();
    store.persist()?;

    if json {
        println!("{}", serde_json::json!({ "cleared": cleared }));
    } else if cleared {
        println!("Targets cleared");
    } else {
        eprintln!("No target was set");
    }
    Ok(())
}

fn print_targets(
    goal_calories: Option<f64>,
    targets: &MacroTargets,
    split: &MacroSplitInputs,
    json: bool,
) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "goal_calories": goal_calories,
                "macro_targets": targets,
                "macro_split": split,
            }))?
        );
        return Ok(());
    }

    if let Some(cal) = goal_calories {
        print!("Goal: {cal:.0} kcal/day");
    }
    if let (Some(p), Some(c), Some(f)) = (split.protein, split.carbs, split.fat) {
        let pg = targets.protein.unwrap_or(0.0);
        let cg = targets.carbs.unwrap_or(0.0);
        let fg = targets.fat.unwrap_or(0.0);
        print!("  Protein: {p}% ({pg:.0}g)  Carbs: {c}% ({cg:.0}g)  Fat: {f}% ({fg:.0}g)");
    }
    println!();
    Ok(())
}
