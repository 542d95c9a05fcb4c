//! Tournament engine: library with models, scheduling logic, store, and event bus.

pub mod engine;
pub mod logic;
pub mod models;
pub mod notify;
pub mod store;

pub use engine::{Engine, FinalsGenerator};
pub use logic::{
    assign_slots, generate_schedule, groups_from_links, parse_clock, parse_roster,
    partition_teams, select_current_stage, DrawResult, FinalsSummary, KickoffPlan,
    KickoffSummary, Round, ScheduleOptions, ScheduleSummary,
};
pub use models::{
    AthleteId, DrawAssignment, EngineError, EventDetails, EventId, EventType, GameMatch, Group,
    MatchEvent, MatchId, MatchKind, MatchStatus, RecordEventRequest, Stage, StageId, StageKind,
    StageStatus, StageTeamLink, Team, TeamId, MAX_MINUTE,
};
pub use notify::{Channel, DomainEvent, Notifier, Projection, RevisionCounter};
pub use store::{ClearSummary, MemoryStore, Repository};
