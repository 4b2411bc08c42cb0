use anyhow::{Result, bail};

use crate::models::{
    ActivityLevel, MacroSplitInputs, MacroTargets, ProfileInputs, Sex, validate_macro_split,
};

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// Mifflin-St Jeor resting metabolic rate, in kcal/day.
///
/// `10 x kg + 6.25 x cm - 5 x age`, plus 5 for men or minus 161 for women.
/// Returns `None` unless sex, age, weight and height are all known.
#[must_use]
pub fn resting_metabolic_rate(profile: &ProfileInputs) -> Option<f64> {
    let (sex, age, weight, height) = (
        profile.gender?,
        profile.age?,
        profile.weight?,
        profile.height?,
    );
    let offset = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    Some(10.0 * weight + 6.25 * height - 5.0 * age + offset)
}

#[must_use]
pub fn total_daily_energy(rmr: f64, activity: ActivityLevel) -> f64 {
    rmr * activity.factor()
}

/// Gram targets for a calorie goal. Without a complete split only the
/// calorie target is set.
pub fn macro_targets(goal_calories: f64, split: &MacroSplitInputs) -> Result<MacroTargets> {
    if !goal_calories.is_finite() || goal_calories <= 0.0 {
        bail!("Calorie goal must be greater than 0");
    }

    let grams = |pct: i64, kcal_per_g: f64| {
        #[allow(clippy::cast_precision_loss)]
        let pct = pct as f64;
        goal_calories * pct / 100.0 / kcal_per_g
    };

    match (split.protein, split.carbs, split.fat) {
        (None, None, None) => Ok(MacroTargets {
            kcal: Some(goal_calories),
            ..MacroTargets::default()
        }),
        (Some(p), Some(c), Some(f)) => {
            validate_macro_split(p, c, f)?;
            Ok(MacroTargets {
                kcal: Some(goal_calories),
                protein: Some(grams(p, KCAL_PER_G_PROTEIN)),
                carbs: Some(grams(c, KCAL_PER_G_CARBS)),
                fat: Some(grams(f, KCAL_PER_G_FAT)),
            })
        }
        _ => bail!("A macro split needs all three percentages (protein, carbs, fat)"),
    }
}
