//! Group draw: split a stage's teams into Group A / Group B.

use crate::engine::Engine;
use crate::models::{DrawAssignment, EngineError, Group, StageId, StageTeamLink, TeamId};
use crate::notify::DomainEvent;
use crate::store::Repository;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Result of a draw: both groups in draw order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DrawResult {
    pub group_a: Vec<TeamId>,
    pub group_b: Vec<TeamId>,
}

impl DrawResult {
    pub fn assignments(&self) -> Vec<DrawAssignment> {
        let tag = |group: Group, teams: &[TeamId]| {
            teams
                .iter()
                .enumerate()
                .map(|(i, &team_id)| DrawAssignment {
                    team_id,
                    group,
                    order: i as u32 + 1,
                })
                .collect::<Vec<_>>()
        };
        let mut all = tag(Group::A, &self.group_a);
        all.extend(tag(Group::B, &self.group_b));
        all
    }
}

/// Shuffle the teams (Fisher-Yates) and cut the permutation in two:
/// the first `ceil(n/2)` go to Group A, the rest to Group B.
pub fn partition_teams<R: Rng>(
    teams: &[TeamId],
    rng: &mut R,
) -> Result<DrawResult, EngineError> {
    if teams.len() < 2 {
        return Err(EngineError::InsufficientTeams { found: teams.len() });
    }
    let mut shuffled = teams.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    let group_b = shuffled.split_off(shuffled.len().div_ceil(2));
    Ok(DrawResult {
        group_a: shuffled,
        group_b,
    })
}

/// Order the stage's links into groups by their recorded draw order.
/// Undrawn links sort after drawn ones, in import order.
pub fn groups_from_links(links: &[StageTeamLink]) -> DrawResult {
    let pick = |group: Group| {
        let mut members: Vec<(usize, &StageTeamLink)> = links
            .iter()
            .enumerate()
            .filter(|(_, l)| l.group == group)
            .collect();
        members.sort_by_key(|(idx, l)| (l.draw_order.is_none(), l.draw_order, *idx));
        members.into_iter().map(|(_, l)| l.team_id).collect::<Vec<_>>()
    };
    DrawResult {
        group_a: pick(Group::A),
        group_b: pick(Group::B),
    }
}

impl<R: Repository> Engine<R> {
    /// Random draw for a stage using the thread RNG.
    pub fn draw(&self, stage_id: StageId) -> Result<DrawResult, EngineError> {
        self.draw_with_rng(stage_id, &mut rand::thread_rng())
    }

    /// Random draw with an explicit RNG. Overwrites any previous draw; matches
    /// already generated are left alone.
    pub fn draw_with_rng<G: Rng>(
        &self,
        stage_id: StageId,
        rng: &mut G,
    ) -> Result<DrawResult, EngineError> {
        let links = self.store.team_links(stage_id)?;
        let teams: Vec<TeamId> = links.iter().map(|l| l.team_id).collect();
        let result = partition_teams(&teams, rng)?;
        self.store.apply_draw(stage_id, &result.assignments())?;
        log::info!(
            "Draw for stage {}: {} teams in A, {} in B",
            stage_id,
            result.group_a.len(),
            result.group_b.len()
        );
        self.notifier.publish(DomainEvent::DrawCommitted { stage_id });
        Ok(result)
    }

    /// Commit a host-driven draw verbatim. Each team must belong to the stage
    /// and appear once; orders are trusted as given.
    pub fn apply_manual_draw(
        &self,
        stage_id: StageId,
        assignments: &[DrawAssignment],
    ) -> Result<usize, EngineError> {
        let mut seen = HashSet::new();
        for a in assignments {
            if !seen.insert(a.team_id) {
                return Err(EngineError::validation(format!(
                    "team {} assigned more than once",
                    a.team_id
                )));
            }
        }
        let updated = self.store.apply_draw(stage_id, assignments)?;
        log::info!("Manual draw for stage {}: {} teams assigned", stage_id, updated);
        self.notifier.publish(DomainEvent::DrawCommitted { stage_id });
        Ok(updated)
    }

    /// Current groups of a stage, in draw order.
    pub fn groups(&self, stage_id: StageId) -> Result<DrawResult, EngineError> {
        Ok(groups_from_links(&self.store.team_links(stage_id)?))
    }
}
