use anyhow::Result;
use chrono::NaiveDate;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use macrolog_core::rollover::RolloverOutcome;
use macrolog_core::storage::KeyValueStore;
use macrolog_core::store::StateStore;

use super::helpers::{confirm, no_neg_zero};

pub(crate) fn cmd_close_day<S: KeyValueStore>(
    store: &mut StateStore<S>,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let outcome = store.close_day_manually(today)?;

    if json {
        let archived = match &outcome {
            RolloverOutcome::Archived(record) => Some(record),
            _ => None,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "archived": archived,
                "active_date": store.state().last_active_date,
            }))?
        );
        return Ok(());
    }

    match outcome {
        RolloverOutcome::Archived(record) => {
            let date = record.date;
            let count = record.meal_count;
            let kcal = record.totals.kcal;
            println!("Closed {date}: {count} items, {kcal:.0} kcal moved to history");
        }
        RolloverOutcome::Unchanged | RolloverOutcome::DateRefreshed => {
            println!("Nothing logged; started a new day for {today}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_reset<S: KeyValueStore>(
    store: &mut StateStore<S>,
    today: NaiveDate,
    yes: bool,
    json: bool,
) -> Result<()> {
    if !yes && !confirm("Erase ALL data? This cannot be undone.")? {
        eprintln!("Reset cancelled");
        process::exit(2);
    }

    store.reset(today)?;

    if json {
        println!("{}", serde_json::json!({ "reset": true }));
    } else {
        println!("All data erased");
    }
    Ok(())
}

pub(crate) fn cmd_history<S: KeyValueStore>(
    store: &StateStore<S>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Items")]
        items: usize,
        #[tabled(rename = "Closed by")]
        reason: &'static str,
    }

    let history = &store.state().history;
    let days = &history[..limit.map_or(history.len(), |n| n.min(history.len()))];

    if json {
        println!("{}", serde_json::to_string_pretty(days)?);
        return Ok(());
    }

    if days.is_empty() {
        eprintln!("No past days stored yet.");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = days
        .iter()
        .map(|d| {
            let t = &d.totals;
            HistoryRow {
                date: d.date.format("%Y-%m-%d").to_string(),
                calories: format!("{:.0}", no_neg_zero(t.kcal)),
                protein: format!("{:.0}g", no_neg_zero(t.protein)),
                carbs: format!("{:.0}g", no_neg_zero(t.carbs)),
                fat: format!("{:.0}g", no_neg_zero(t.fat)),
                items: d.meal_count,
                reason: d.reason.as_str(),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
