use anyhow::Result;

use macrolog_core::storage::KeyValueStore;
use macrolog_core::store::StateStore;
use macrolog_core::summary::DailySummary;

use super::helpers::{no_neg_zero, render_bar};

pub(crate) fn cmd_summary<S: KeyValueStore>(store: &StateStore<S>, json: bool) -> Result<()> {
    let summary = DailySummary::from_state(store.state());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let date = summary.date;
    println!("=== {date} ===\n");

    let count = summary.meals.len();
    let t = &summary.totals;
    let (cal, p, c, f) = (
        no_neg_zero(t.kcal),
        no_neg_zero(t.protein),
        no_neg_zero(t.carbs),
        no_neg_zero(t.fat),
    );
    println!("  INTAKE: {cal:.0} kcal | P:{p:.0}g C:{c:.0}g F:{f:.0}g ({count} items)");

    match summary.tdee {
        Some(tdee) => println!("  TDEE:   {tdee:.0} kcal"),
        None => println!("  TDEE:   – kcal"),
    }
    println!();

    for bar in &summary.progress {
        let name = bar.nutrient;
        let gauge = render_bar(bar.percent);
        let pct = bar.percent;
        let label = &bar.label;
        println!("  {name:<8} {gauge} {pct:>3.0}%  {label}");
    }

    Ok(())
}
