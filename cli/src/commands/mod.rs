mod day;
mod helpers;
mod meal;
mod profile;
mod summary;
mod target;

pub(crate) use day::{cmd_close_day, cmd_history, cmd_reset};
pub(crate) use helpers::report_unsaved;
pub(crate) use meal::{cmd_add, cmd_delete, cmd_list};
pub(crate) use profile::{ProfileUpdate, cmd_profile_set, cmd_profile_show};
pub(crate) use summary::cmd_summary;
pub(crate) use target::{cmd_target_clear, cmd_target_set, cmd_target_show};
