use anyhow::{Result, bail};

use macrolog_core::models::{ActivityLevel, ProfileInputs, Sex};
use macrolog_core::storage::KeyValueStore;
use macrolog_core::store::StateStore;

/// Fields left as `None` keep their stored value.
pub(crate) struct ProfileUpdate {
    pub(crate) sex: Option<String>,
    pub(crate) age: Option<f64>,
    pub(crate) weight: Option<f64>,
    pub(crate) height: Option<f64>,
    pub(crate) activity: Option<String>,
}

fn apply_update(mut profile: ProfileInputs, update: ProfileUpdate) -> Result<ProfileInputs> {
    if let Some(s) = update.sex {
        let Some(sex) = Sex::parse(&s) else {
            bail!("Invalid sex '{s}'. Use 'male' or 'female'");
        };
        profile.gender = Some(sex);
    }
    if let Some(a) = update.activity {
        let Some(level) = ActivityLevel::parse(&a) else {
            bail!(
                "Invalid activity '{a}'. Use sedentary, light, moderate, very, or extra"
            );
        };
        profile.activity = Some(level);
    }
    for (label, value, slot) in [
        ("Age", update.age, &mut profile.age),
        ("Weight", update.weight, &mut profile.weight),
        ("Height", update.height, &mut profile.height),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 {
                bail!("{label} must be greater than 0");
            }
            *slot = Some(v);
        }
    }
    Ok(profile)
}

pub(crate) fn cmd_profile_set<S: KeyValueStore>(
    store: &mut StateStore<S>,
    update: ProfileUpdate,
    json: bool,
) -> Result<()> {
    let profile = apply_update(store.state().profile, update)?;
    store.update_profile(profile);
    store.persist()?;
    cmd_profile_show(store, json)
}

pub(crate) fn cmd_profile_show<S: KeyValueStore>(store: &StateStore<S>, json: bool) -> Result<()> {
    let state = store.state();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "profile": state.profile,
                "rmr": state.rmr,
                "tdee": state.tdee,
            }))?
        );
        return Ok(());
    }

    let p = &state.profile;
    let sex = match p.gender {
        Some(Sex::Male) => "male",
        Some(Sex::Female) => "female",
        None => "–",
    };
    let fmt = |v: Option<f64>, unit: &str| v.map_or("–".to_string(), |v| format!("{v}{unit}"));
    println!(
        "Sex: {sex}  Age: {}  Weight: {}  Height: {}",
        fmt(p.age, ""),
        fmt(p.weight, " kg"),
        fmt(p.height, " cm"),
    );
    if let Some(level) = p.activity {
        println!("Activity: {level:?} (x{})", level.factor());
    }
    match (state.rmr, state.tdee) {
        (Some(rmr), Some(tdee)) => println!("RMR: {rmr:.0} kcal  TDEE: {tdee:.0} kcal"),
        (Some(rmr), None) => println!("RMR: {rmr:.0} kcal  TDEE: set --activity to estimate"),
        _ => println!("Set sex, age, weight and height to estimate energy needs"),
    }
    Ok(())
}
