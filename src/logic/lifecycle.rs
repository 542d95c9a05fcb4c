//! Match lifecycle (score, status, schedule) and the append-only event ledger.

use crate::engine::Engine;
use crate::models::{
    EngineError, EventId, GameMatch, MatchEvent, MatchId, MatchStatus, RecordEventRequest, StageId,
};
use crate::notify::DomainEvent;
use crate::store::Repository;
use chrono::{NaiveDate, NaiveTime};

impl<R: Repository> Engine<R> {
    /// Overwrite the score. Status is not checked, so a scheduled match may
    /// carry a score before it is finalized.
    pub fn set_match_score(
        &self,
        match_id: MatchId,
        score_a: u32,
        score_b: u32,
        penalty_a: Option<u32>,
        penalty_b: Option<u32>,
    ) -> Result<GameMatch, EngineError> {
        let game = self.store.update_match(match_id, |game| {
            game.set_score(score_a, score_b, penalty_a, penalty_b);
            Ok(())
        })?;
        log::debug!("Match {} score {}-{}", match_id, score_a, score_b);
        self.match_updated(&game);
        Ok(game)
    }

    /// Set status and the `finalized` mirror. Any transition is allowed,
    /// backward included; finalizing requires both scores.
    pub fn set_match_status(&self, match_id: MatchId, status: MatchStatus) -> Result<GameMatch, EngineError> {
        let game = self
            .store
            .update_match(match_id, |game| game.set_status(status))?;
        log::debug!("Match {} status {:?}", match_id, status);
        self.match_updated(&game);
        Ok(game)
    }

    pub fn update_match_schedule(
        &self,
        match_id: MatchId,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        referee: Option<String>,
    ) -> Result<GameMatch, EngineError> {
        let referee = referee.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        let game = self.store.update_match(match_id, |game| {
            game.date = date;
            game.time = time;
            game.referee = referee;
            Ok(())
        })?;
        self.match_updated(&game);
        Ok(game)
    }

    /// Validate and append an event. The team must be one of the two sides.
    pub fn record_match_event(&self, request: RecordEventRequest) -> Result<MatchEvent, EngineError> {
        let event = request.validate()?;
        let game = self.store.game_match(event.match_id)?;
        if !game.involves(event.team_id) {
            return Err(EngineError::validation(format!(
                "team {} does not play match {}",
                event.team_id, game.id
            )));
        }
        let event = self.store.insert_event(event)?;
        log::debug!(
            "Match {} event {:?} for team {} (minute {:?})",
            game.id,
            event.event_type,
            event.team_id,
            event.details.minute
        );
        self.notifier.publish(DomainEvent::MatchEventRecorded {
            stage_id: game.stage_id,
            match_id: game.id,
            event_id: event.id,
        });
        Ok(event)
    }

    /// Remove a single mis-recorded event.
    pub fn delete_match_event(&self, event_id: EventId) -> Result<MatchEvent, EngineError> {
        let event = self.store.delete_event(event_id)?;
        let stage_id = self.store.game_match(event.match_id)?.stage_id;
        log::debug!("Match {} event {} deleted", event.match_id, event_id);
        self.notifier.publish(DomainEvent::MatchEventDeleted {
            stage_id,
            match_id: event.match_id,
            event_id,
        });
        Ok(event)
    }

    /// Events of a match, oldest first.
    pub fn list_events(&self, match_id: MatchId) -> Result<Vec<MatchEvent>, EngineError> {
        self.store.events(match_id)
    }

    /// Matches of a stage by round, then creation order.
    pub fn list_matches(&self, stage_id: StageId) -> Result<Vec<GameMatch>, EngineError> {
        let mut matches = self.store.matches(stage_id)?;
        matches.sort_by_key(|m| (m.round, m.seq));
        Ok(matches)
    }

    /// Latest events of the stage, newest first.
    pub fn live_feed(&self, stage_id: StageId, limit: usize) -> Result<Vec<MatchEvent>, EngineError> {
        let mut events = self.store.stage_events(stage_id)?;
        events.reverse();
        events.truncate(limit);
        Ok(events)
    }

    fn match_updated(&self, game: &GameMatch) {
        self.notifier.publish(DomainEvent::MatchUpdated {
            stage_id: game.stage_id,
            match_id: game.id,
        });
    }
}
