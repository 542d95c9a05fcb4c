//! Shared setup for integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use tournament_engine_web::{
    Channel, DrawAssignment, Engine, FinalsGenerator, Group, MemoryStore, Notifier,
    RevisionCounter, StageId, StageKind, TeamId,
};

/// Finals delegate that answers with a fixed result.
pub struct FixedFinals(pub Result<usize, String>);

impl FinalsGenerator for FixedFinals {
    fn generate(&self, _stage_id: StageId, _cutoff: NaiveDate) -> Result<usize, String> {
        self.0.clone()
    }
}

pub struct Harness {
    pub engine: Engine<MemoryStore>,
    pub live: Arc<RevisionCounter>,
    pub standings: Arc<RevisionCounter>,
}

pub fn harness() -> Harness {
    harness_with_finals(Box::new(FixedFinals(Ok(0))))
}

pub fn harness_with_finals(finals: Box<dyn FinalsGenerator>) -> Harness {
    let live = Arc::new(RevisionCounter::new());
    let standings = Arc::new(RevisionCounter::new());
    let mut notifier = Notifier::new();
    notifier.subscribe(Channel::LiveView, live.clone());
    notifier.subscribe(Channel::Standings, standings.clone());
    Harness {
        engine: Engine::new(MemoryStore::new(), notifier, finals),
        live,
        standings,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Stage starting 2026-03-14 with `n` imported teams (all group A, undrawn).
pub fn stage_with_teams(h: &Harness, n: usize) -> (StageId, Vec<TeamId>) {
    let stage = h
        .engine
        .create_stage("futsal", "Spring Cup", StageKind::League, date(2026, 3, 14), "Arena")
        .unwrap();
    let teams = (0..n)
        .map(|i| {
            h.engine
                .import_team(stage.id, &format!("Team {i}"), "Lisbon")
                .unwrap()
                .team_id
        })
        .collect();
    (stage.id, teams)
}

/// Stage with `a` teams drawn into group A and `b` into group B, in order.
pub fn drawn_stage(h: &Harness, a: usize, b: usize) -> (StageId, Vec<TeamId>, Vec<TeamId>) {
    let (stage_id, teams) = stage_with_teams(h, a + b);
    let group_a = teams[..a].to_vec();
    let group_b = teams[a..].to_vec();
    let mut assignments = Vec::new();
    for (i, &team_id) in group_a.iter().enumerate() {
        assignments.push(DrawAssignment { team_id, group: Group::A, order: i as u32 + 1 });
    }
    for (i, &team_id) in group_b.iter().enumerate() {
        assignments.push(DrawAssignment { team_id, group: Group::B, order: i as u32 + 1 });
    }
    h.engine.apply_manual_draw(stage_id, &assignments).unwrap();
    (stage_id, group_a, group_b)
}
