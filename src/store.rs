//! Persistence boundary: the `Repository` trait and an in-memory implementation.
//!
//! Every batch method (draw commit, match replacement, stage clear) validates the
//! whole batch first and then applies it under one write lock, so a batch either
//! lands completely or not at all. Match updates take a closure and run it on the
//! stored row under the write lock.

use crate::models::{
    DrawAssignment, EngineError, EventId, GameMatch, MatchEvent, MatchId, MatchKind, Stage,
    StageId, StageStatus, StageTeamLink, Team, TeamId,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Counts of rows removed by a stage clear.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClearSummary {
    pub links_removed: usize,
    pub matches_removed: usize,
    pub events_removed: usize,
}

/// The relational store the engine talks to.
pub trait Repository: Send + Sync {
    fn insert_stage(&self, stage: Stage) -> Result<Stage, EngineError>;
    fn stage(&self, id: StageId) -> Result<Stage, EngineError>;
    fn stages(&self) -> Result<Vec<Stage>, EngineError>;
    fn set_stage_status(&self, id: StageId, status: StageStatus) -> Result<Stage, EngineError>;

    fn insert_team(&self, team: Team) -> Result<Team, EngineError>;
    fn team(&self, id: TeamId) -> Result<Team, EngineError>;

    /// Insert a link; a second link for the same (stage, team) is a validation error.
    fn link_team(&self, link: StageTeamLink) -> Result<StageTeamLink, EngineError>;
    fn unlink_team(&self, stage_id: StageId, team_id: TeamId) -> Result<(), EngineError>;
    /// Links in import order.
    fn team_links(&self, stage_id: StageId) -> Result<Vec<StageTeamLink>, EngineError>;
    /// Overwrite group and draw order for every assigned team, atomically.
    fn apply_draw(&self, stage_id: StageId, assignments: &[DrawAssignment]) -> Result<usize, EngineError>;

    /// Insert `matches` for the stage. With `clear_existing`, previous matches of
    /// `kind` (and their events) are removed in the same batch.
    fn replace_matches(
        &self,
        stage_id: StageId,
        kind: MatchKind,
        matches: Vec<GameMatch>,
        clear_existing: bool,
    ) -> Result<usize, EngineError>;
    /// Matches of a stage in creation order.
    fn matches(&self, stage_id: StageId) -> Result<Vec<GameMatch>, EngineError>;
    fn game_match(&self, id: MatchId) -> Result<GameMatch, EngineError>;
    /// Apply `f` to the stored match under the write lock. On `Err` the row is
    /// left as it was. Returns the updated match.
    fn update_match<F>(&self, id: MatchId, f: F) -> Result<GameMatch, EngineError>
    where
        F: FnOnce(&mut GameMatch) -> Result<(), EngineError>;
    /// Apply `f` to every match of the stage under one write lock; returns how
    /// many matches it was given. On `Err` nothing is written.
    fn update_stage_matches<F>(&self, stage_id: StageId, f: F) -> Result<usize, EngineError>
    where
        F: FnOnce(&mut [&mut GameMatch]) -> Result<(), EngineError>;

    fn insert_event(&self, event: MatchEvent) -> Result<MatchEvent, EngineError>;
    fn delete_event(&self, id: EventId) -> Result<MatchEvent, EngineError>;
    /// Events of a match in creation order.
    fn events(&self, match_id: MatchId) -> Result<Vec<MatchEvent>, EngineError>;
    /// Events of every match of the stage in creation order.
    fn stage_events(&self, stage_id: StageId) -> Result<Vec<MatchEvent>, EngineError>;

    /// Remove links, matches, and events of the stage. The stage row stays.
    fn clear_stage(&self, stage_id: StageId) -> Result<ClearSummary, EngineError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    stages: HashMap<StageId, Stage>,
    teams: HashMap<TeamId, Team>,
    links: Vec<StageTeamLink>,
    matches: HashMap<MatchId, GameMatch>,
    events: HashMap<EventId, MatchEvent>,
    next_seq: u64,
}

impl StoreState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn require_stage(&self, id: StageId) -> Result<&Stage, EngineError> {
        self.stages.get(&id).ok_or(EngineError::not_found("stage", id))
    }
}

/// In-process store. Serializable to a JSON snapshot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a snapshot produced by [`MemoryStore::snapshot`].
    pub fn from_snapshot(json: &str) -> Result<Self, EngineError> {
        let state: StoreState = serde_json::from_str(json)
            .map_err(|e| EngineError::StoreUnavailable(format!("bad snapshot: {}", e)))?;
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    pub fn snapshot(&self) -> Result<String, EngineError> {
        let g = self.read()?;
        serde_json::to_string(&*g)
            .map_err(|e| EngineError::StoreUnavailable(format!("snapshot failed: {}", e)))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, EngineError> {
        self.state
            .read()
            .map_err(|_| EngineError::StoreUnavailable("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, EngineError> {
        self.state
            .write()
            .map_err(|_| EngineError::StoreUnavailable("lock error".to_string()))
    }
}

impl Repository for MemoryStore {
    fn insert_stage(&self, stage: Stage) -> Result<Stage, EngineError> {
        let mut g = self.write()?;
        g.stages.insert(stage.id, stage.clone());
        Ok(stage)
    }

    fn stage(&self, id: StageId) -> Result<Stage, EngineError> {
        self.read()?.require_stage(id).cloned()
    }

    fn stages(&self) -> Result<Vec<Stage>, EngineError> {
        let g = self.read()?;
        let mut stages: Vec<Stage> = g.stages.values().cloned().collect();
        stages.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.title.cmp(&b.title)));
        Ok(stages)
    }

    fn set_stage_status(&self, id: StageId, status: StageStatus) -> Result<Stage, EngineError> {
        let mut g = self.write()?;
        let stage = g
            .stages
            .get_mut(&id)
            .ok_or(EngineError::not_found("stage", id))?;
        stage.status = status;
        Ok(stage.clone())
    }

    fn insert_team(&self, team: Team) -> Result<Team, EngineError> {
        let mut g = self.write()?;
        g.teams.insert(team.id, team.clone());
        Ok(team)
    }

    fn team(&self, id: TeamId) -> Result<Team, EngineError> {
        self.read()?
            .teams
            .get(&id)
            .cloned()
            .ok_or(EngineError::not_found("team", id))
    }

    fn link_team(&self, link: StageTeamLink) -> Result<StageTeamLink, EngineError> {
        let mut g = self.write()?;
        g.require_stage(link.stage_id)?;
        if !g.teams.contains_key(&link.team_id) {
            return Err(EngineError::not_found("team", link.team_id));
        }
        let exists = g
            .links
            .iter()
            .any(|l| l.stage_id == link.stage_id && l.team_id == link.team_id);
        if exists {
            return Err(EngineError::validation("team is already registered in this stage"));
        }
        g.links.push(link.clone());
        Ok(link)
    }

    fn unlink_team(&self, stage_id: StageId, team_id: TeamId) -> Result<(), EngineError> {
        let mut g = self.write()?;
        let idx = g
            .links
            .iter()
            .position(|l| l.stage_id == stage_id && l.team_id == team_id)
            .ok_or(EngineError::not_found("stage team", team_id))?;
        g.links.remove(idx);
        Ok(())
    }

    fn team_links(&self, stage_id: StageId) -> Result<Vec<StageTeamLink>, EngineError> {
        let g = self.read()?;
        g.require_stage(stage_id)?;
        Ok(g.links
            .iter()
            .filter(|l| l.stage_id == stage_id)
            .cloned()
            .collect())
    }

    fn apply_draw(&self, stage_id: StageId, assignments: &[DrawAssignment]) -> Result<usize, EngineError> {
        let mut g = self.write()?;
        g.require_stage(stage_id)?;
        for a in assignments {
            let linked = g
                .links
                .iter()
                .any(|l| l.stage_id == stage_id && l.team_id == a.team_id);
            if !linked {
                return Err(EngineError::validation(format!(
                    "team {} is not registered in this stage",
                    a.team_id
                )));
            }
        }
        let mut updated = 0;
        for link in g.links.iter_mut().filter(|l| l.stage_id == stage_id) {
            if let Some(a) = assignments.iter().find(|a| a.team_id == link.team_id) {
                link.group = a.group;
                link.draw_order = Some(a.order);
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn replace_matches(
        &self,
        stage_id: StageId,
        kind: MatchKind,
        matches: Vec<GameMatch>,
        clear_existing: bool,
    ) -> Result<usize, EngineError> {
        let mut g = self.write()?;
        g.require_stage(stage_id)?;
        if matches.iter().any(|m| m.stage_id != stage_id) {
            return Err(EngineError::validation("match belongs to a different stage"));
        }
        if clear_existing {
            let removed: HashSet<MatchId> = g
                .matches
                .values()
                .filter(|m| m.stage_id == stage_id && m.kind == kind)
                .map(|m| m.id)
                .collect();
            g.matches.retain(|id, _| !removed.contains(id));
            g.events.retain(|_, e| !removed.contains(&e.match_id));
        }
        let created = matches.len();
        for mut m in matches {
            m.seq = g.next_seq();
            g.matches.insert(m.id, m);
        }
        Ok(created)
    }

    fn matches(&self, stage_id: StageId) -> Result<Vec<GameMatch>, EngineError> {
        let g = self.read()?;
        g.require_stage(stage_id)?;
        let mut matches: Vec<GameMatch> = g
            .matches
            .values()
            .filter(|m| m.stage_id == stage_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.seq);
        Ok(matches)
    }

    fn game_match(&self, id: MatchId) -> Result<GameMatch, EngineError> {
        self.read()?
            .matches
            .get(&id)
            .cloned()
            .ok_or(EngineError::not_found("match", id))
    }

    fn update_match<F>(&self, id: MatchId, f: F) -> Result<GameMatch, EngineError>
    where
        F: FnOnce(&mut GameMatch) -> Result<(), EngineError>,
    {
        let mut g = self.write()?;
        let slot = g
            .matches
            .get_mut(&id)
            .ok_or(EngineError::not_found("match", id))?;
        let mut game = slot.clone();
        f(&mut game)?;
        *slot = game.clone();
        Ok(game)
    }

    fn update_stage_matches<F>(&self, stage_id: StageId, f: F) -> Result<usize, EngineError>
    where
        F: FnOnce(&mut [&mut GameMatch]) -> Result<(), EngineError>,
    {
        let mut g = self.write()?;
        g.require_stage(stage_id)?;
        let mut staged: Vec<GameMatch> = g
            .matches
            .values()
            .filter(|m| m.stage_id == stage_id)
            .cloned()
            .collect();
        {
            let mut refs: Vec<&mut GameMatch> = staged.iter_mut().collect();
            f(&mut refs)?;
        }
        let updated = staged.len();
        for game in staged {
            g.matches.insert(game.id, game);
        }
        Ok(updated)
    }

    fn insert_event(&self, mut event: MatchEvent) -> Result<MatchEvent, EngineError> {
        let mut g = self.write()?;
        if !g.matches.contains_key(&event.match_id) {
            return Err(EngineError::not_found("match", event.match_id));
        }
        event.seq = g.next_seq();
        g.events.insert(event.id, event.clone());
        Ok(event)
    }

    fn delete_event(&self, id: EventId) -> Result<MatchEvent, EngineError> {
        self.write()?
            .events
            .remove(&id)
            .ok_or(EngineError::not_found("event", id))
    }

    fn events(&self, match_id: MatchId) -> Result<Vec<MatchEvent>, EngineError> {
        let g = self.read()?;
        if !g.matches.contains_key(&match_id) {
            return Err(EngineError::not_found("match", match_id));
        }
        let mut events: Vec<MatchEvent> = g
            .events
            .values()
            .filter(|e| e.match_id == match_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.seq);
        Ok(events)
    }

    fn stage_events(&self, stage_id: StageId) -> Result<Vec<MatchEvent>, EngineError> {
        let g = self.read()?;
        g.require_stage(stage_id)?;
        let mut events: Vec<MatchEvent> = g
            .events
            .values()
            .filter(|e| {
                g.matches
                    .get(&e.match_id)
                    .is_some_and(|m| m.stage_id == stage_id)
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| e.seq);
        Ok(events)
    }

    fn clear_stage(&self, stage_id: StageId) -> Result<ClearSummary, EngineError> {
        let mut g = self.write()?;
        g.require_stage(stage_id)?;
        let removed: HashSet<MatchId> = g
            .matches
            .values()
            .filter(|m| m.stage_id == stage_id)
            .map(|m| m.id)
            .collect();
        let links_before = g.links.len();
        let events_before = g.events.len();
        g.links.retain(|l| l.stage_id != stage_id);
        g.matches.retain(|id, _| !removed.contains(id));
        g.events.retain(|_, e| !removed.contains(&e.match_id));
        Ok(ClearSummary {
            links_removed: links_before - g.links.len(),
            matches_removed: removed.len(),
            events_removed: events_before - g.events.len(),
        })
    }
}
