use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use macrolog_core::models::MealEntry;

const BAR_WIDTH: usize = 20;

/// Ask a yes/no question on stderr. Anything but "y"/"yes" is a no.
pub(crate) fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N]: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(parse_yes(&line))
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Report a failed save without aborting the command.
pub(crate) fn report_unsaved(err: &anyhow::Error) {
    tracing::warn!("state not saved: {err:#}");
    eprintln!("Warning: changes could not be saved: {err:#}");
}

/// Convert a 1-based display number into a meal index. `0` has no position.
pub(crate) fn display_to_index(number: usize) -> Option<usize> {
    number.checked_sub(1)
}

pub(crate) fn print_meal_table(meals: &[MealEntry]) {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
    }

    let rows: Vec<MealRow> = meals
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let n = &m.nutrients;
            MealRow {
                idx: i + 1,
                name: truncate(&m.name, 35),
                calories: format!("{:.0}", no_neg_zero(n.calories)),
                protein: format!("{:.1}g", no_neg_zero(n.protein)),
                carbs: format!("{:.1}g", no_neg_zero(n.carbs)),
                fat: format!("{:.1}g", no_neg_zero(n.fat)),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

/// Text progress bar for a percentage in 0..=150; 100% fills the bar.
pub(crate) fn render_bar(percent: f64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let width = BAR_WIDTH as f64;
    #[allow(clippy::cast_sign_loss)]
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width).round() as usize;
    let mut bar = String::with_capacity(BAR_WIDTH + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&"-".repeat(BAR_WIDTH - filled));
    bar.push(']');
    bar
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
