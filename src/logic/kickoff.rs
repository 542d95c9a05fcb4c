//! Kickoff slots: sequential start times for a stage's matches.

use crate::engine::Engine;
use crate::models::{EngineError, GameMatch, StageId};
use crate::notify::DomainEvent;
use crate::store::Repository;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct KickoffPlan {
    pub date: NaiveDate,
    /// "HH:MM" or "HH:MM:SS".
    pub start_time: String,
    pub duration_minutes: u32,
    pub interval_minutes: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct KickoffSummary {
    pub matches_updated: usize,
}

/// Parse a wall-clock time written as "HH:MM" or "HH:MM:SS".
pub fn parse_clock(raw: &str) -> Result<NaiveTime, EngineError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| EngineError::validation(format!("invalid start time '{}'", raw)))
}

/// Stamp `date` and consecutive kickoff times on `matches`.
///
/// Matches are taken by round, then creation order. The clock advances by
/// duration + interval per match and wraps past midnight without touching the date.
pub fn assign_slots(
    matches: &mut [&mut GameMatch],
    date: NaiveDate,
    start: NaiveTime,
    duration_minutes: u32,
    interval_minutes: u32,
) {
    matches.sort_by_key(|m| (m.round, m.seq));
    let step = Duration::minutes(i64::from(duration_minutes) + i64::from(interval_minutes));
    let mut clock = start;
    for m in matches.iter_mut() {
        m.date = Some(date);
        m.time = Some(clock);
        clock = clock.overflowing_add_signed(step).0;
    }
}

impl<R: Repository> Engine<R> {
    /// Assign kickoff times to every match of the stage in one batch.
    /// A zero duration is allowed; slots are then `interval_minutes` apart.
    pub fn assign_kickoffs(
        &self,
        stage_id: StageId,
        plan: &KickoffPlan,
    ) -> Result<KickoffSummary, EngineError> {
        let start = parse_clock(&plan.start_time)?;
        // Only date and time are stamped, in place, so scores or statuses
        // written concurrently are kept.
        let updated = self.store.update_stage_matches(stage_id, |matches| {
            if matches.is_empty() {
                return Err(EngineError::NoMatches);
            }
            assign_slots(
                matches,
                plan.date,
                start,
                plan.duration_minutes,
                plan.interval_minutes,
            );
            Ok(())
        })?;
        log::info!(
            "Assigned kickoffs to {} matches of stage {} on {} from {}",
            updated,
            stage_id,
            plan.date,
            start
        );
        self.notifier.publish(DomainEvent::KickoffsAssigned {
            stage_id,
            matches_updated: updated,
        });
        Ok(KickoffSummary {
            matches_updated: updated,
        })
    }
}
