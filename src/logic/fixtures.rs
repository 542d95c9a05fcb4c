//! Inter-group round robin: every Group A team meets every Group B team once.

use crate::engine::Engine;
use crate::logic::draw::groups_from_links;
use crate::models::{EngineError, GameMatch, Group, MatchKind, StageId, TeamId};
use crate::notify::DomainEvent;
use crate::store::Repository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One round of fixtures. `round_number` is 1-based.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Round<T> {
    pub round_number: u32,
    pub pairs: Vec<(T, T)>,
}

/// Rotation schedule for two pools of possibly unequal size.
///
/// The shorter pool is padded with byes to length `n`. In rotation `r`, slot `i`
/// pairs `group_a[i]` with `group_b[(i + r) % n]`; pairs touching a bye are dropped.
/// A rotation with no real pair is left out but still uses up its round number.
pub fn generate_schedule<T: Copy>(group_a: &[T], group_b: &[T]) -> Result<Vec<Round<T>>, EngineError> {
    if group_a.is_empty() {
        return Err(EngineError::EmptyGroup(Group::A));
    }
    if group_b.is_empty() {
        return Err(EngineError::EmptyGroup(Group::B));
    }
    let n = group_a.len().max(group_b.len());
    let padded = |group: &[T]| {
        let mut slots: Vec<Option<T>> = group.iter().copied().map(Some).collect();
        slots.resize(n, None);
        slots
    };
    let a = padded(group_a);
    let b = padded(group_b);

    let mut rounds = Vec::with_capacity(n);
    for r in 0..n {
        let pairs: Vec<(T, T)> = (0..n)
            .filter_map(|i| match (a[i], b[(i + r) % n]) {
                (Some(home), Some(away)) => Some((home, away)),
                _ => None,
            })
            .collect();
        if pairs.is_empty() {
            continue;
        }
        rounds.push(Round {
            round_number: r as u32 + 1,
            pairs,
        });
    }
    Ok(rounds)
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ScheduleOptions {
    /// Date stamped on every fixture; defaults to the stage start date.
    pub base_date: Option<NaiveDate>,
    /// Remove previously generated group matches (and their events) first.
    #[serde(default)]
    pub clear_existing: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub matches_created: usize,
}

impl<R: Repository> Engine<R> {
    /// Build the group-phase fixtures from the stage's current draw.
    pub fn generate_group_schedule(
        &self,
        stage_id: StageId,
        options: ScheduleOptions,
    ) -> Result<ScheduleSummary, EngineError> {
        let stage = self.store.stage(stage_id)?;
        let groups = groups_from_links(&self.store.team_links(stage_id)?);
        let rounds: Vec<Round<TeamId>> = generate_schedule(&groups.group_a, &groups.group_b)?;

        let date = options.base_date.unwrap_or(stage.start_date);
        let matches: Vec<GameMatch> = rounds
            .iter()
            .flat_map(|round| {
                round.pairs.iter().map(move |&(team_a, team_b)| {
                    let mut game = GameMatch::group(stage_id, round.round_number, team_a, team_b);
                    game.date = Some(date);
                    game
                })
            })
            .collect();

        let created = self
            .store
            .replace_matches(stage_id, MatchKind::Group, matches, options.clear_existing)?;
        log::info!(
            "Generated {} group matches over {} rounds for stage {} (clear_existing={})",
            created,
            rounds.len(),
            stage_id,
            options.clear_existing
        );
        self.notifier.publish(DomainEvent::ScheduleGenerated {
            stage_id,
            matches_created: created,
        });
        Ok(ScheduleSummary {
            matches_created: created,
        })
    }
}
