use serde::{Deserialize, Serialize};

use crate::models::{MealEntry, NutrientRecord};

/// Field-wise sum of nutrient records. Stored in history as `{kcal, protein, carbs, fat}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub kcal: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Totals {
    pub fn add(&mut self, record: &NutrientRecord) {
        self.kcal += record.calories;
        self.protein += record.protein;
        self.carbs += record.carbs;
        self.fat += record.fat;
    }
}

/// Sums records without rounding or clamping; rounding happens only at display time.
pub fn aggregate<'a, I>(records: I) -> Totals
where
    I: IntoIterator<Item = &'a NutrientRecord>,
{
    records.into_iter().fold(Totals::default(), |mut acc, r| {
        acc.add(r);
        acc
    })
}

#[must_use]
pub fn aggregate_meals(meals: &[MealEntry]) -> Totals {
    aggregate(meals.iter().map(|m| &m.nutrients))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(calories: f64, protein: f64, carbs: f64, fat: f64) -> NutrientRecord {
        NutrientRecord {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let empty: [NutrientRecord; 0] = [];
        let totals = aggregate(&empty);
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_aggregate_sums_fields() {
        let records = [record(70.0, 6.0, 1.0, 5.0), record(165.0, 31.0, 0.0, 3.6)];
        let totals = aggregate(&records);
        assert!((totals.kcal - 235.0).abs() < 1e-9);
        assert!((totals.protein - 37.0).abs() < 1e-9);
        assert!((totals.carbs - 1.0).abs() < 1e-9);
        assert!((totals.fat - 8.6).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_order_independent() {
        let a = record(100.0, 10.0, 20.0, 5.0);
        let b = record(250.0, 2.0, 40.0, 12.0);
        let c = record(30.0, 0.0, 7.0, 0.0);
        let forward = aggregate(&[a, b, c]);
        let reversed = aggregate(&[c, b, a]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_aggregate_does_not_round() {
        let totals = aggregate(&[record(0.5, 0.25, 0.0, 0.0), record(0.5, 0.25, 0.0, 0.0)]);
        assert!((totals.kcal - 1.0).abs() < 1e-9);
        assert!((totals.protein - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_meals() {
        let meals = vec![
            MealEntry::new("Egg", record(70.0, 6.0, 1.0, 5.0)),
            MealEntry::new("Egg", record(70.0, 6.0, 1.0, 5.0)),
        ];
        let totals = aggregate_meals(&meals);
        assert!((totals.kcal - 140.0).abs() < 1e-9);
        assert!((totals.fat - 10.0).abs() < 1e-9);
    }
}
