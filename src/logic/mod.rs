//! Tournament business logic: stage setup, roster, draw, fixtures, kickoffs,
//! match lifecycle, finals.

mod draw;
mod finals;
mod fixtures;
mod kickoff;
mod lifecycle;
mod roster;
mod setup;

pub use draw::{groups_from_links, partition_teams, DrawResult};
pub use finals::FinalsSummary;
pub use fixtures::{generate_schedule, Round, ScheduleOptions, ScheduleSummary};
pub use kickoff::{assign_slots, parse_clock, KickoffPlan, KickoffSummary};
pub use roster::parse_roster;
pub use setup::select_current_stage;
