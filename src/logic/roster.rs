//! Registering teams into a stage, one by one or from a CSV roster.

use crate::engine::Engine;
use crate::models::{EngineError, StageId, StageTeamLink, Team, TeamId};
use crate::notify::DomainEvent;
use crate::store::Repository;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    #[serde(default)]
    city: String,
}

/// Parse a `name,city` roster. Any bad row fails the whole file.
pub fn parse_roster<Rd: Read>(reader: Rd) -> Result<Vec<Team>, EngineError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut teams = Vec::new();
    for (line, row) in rdr.deserialize::<RosterRow>().enumerate() {
        let row = row.map_err(|e| EngineError::validation(format!("roster row {}: {}", line + 1, e)))?;
        if row.name.is_empty() {
            return Err(EngineError::validation(format!(
                "roster row {}: team name is required",
                line + 1
            )));
        }
        teams.push(Team::new(row.name, row.city));
    }
    Ok(teams)
}

impl<R: Repository> Engine<R> {
    /// Create a team and register it in the stage (group A, not drawn).
    pub fn import_team(&self, stage_id: StageId, name: &str, city: &str) -> Result<StageTeamLink, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("team name is required"));
        }
        self.store.stage(stage_id)?;
        let team = self.store.insert_team(Team::new(name, city.trim()))?;
        let link = self.store.link_team(StageTeamLink::new(stage_id, team.id))?;
        self.notifier.publish(DomainEvent::RosterChanged { stage_id });
        Ok(link)
    }

    /// Register an existing team in the stage.
    pub fn link_team(&self, stage_id: StageId, team_id: TeamId) -> Result<StageTeamLink, EngineError> {
        let link = self.store.link_team(StageTeamLink::new(stage_id, team_id))?;
        self.notifier.publish(DomainEvent::RosterChanged { stage_id });
        Ok(link)
    }

    /// Import every row of a CSV roster into the stage, in file order.
    pub fn import_roster_csv<Rd: Read>(&self, stage_id: StageId, reader: Rd) -> Result<Vec<StageTeamLink>, EngineError> {
        self.store.stage(stage_id)?;
        let teams = parse_roster(reader)?;
        let mut links = Vec::with_capacity(teams.len());
        for team in teams {
            let team = self.store.insert_team(team)?;
            links.push(self.store.link_team(StageTeamLink::new(stage_id, team.id))?);
        }
        log::info!("Imported {} teams into stage {}", links.len(), stage_id);
        self.notifier.publish(DomainEvent::RosterChanged { stage_id });
        Ok(links)
    }

    pub fn remove_team(&self, stage_id: StageId, team_id: TeamId) -> Result<(), EngineError> {
        self.store.unlink_team(stage_id, team_id)?;
        self.notifier.publish(DomainEvent::RosterChanged { stage_id });
        Ok(())
    }

    /// Teams of the stage with their link data, in import order.
    pub fn stage_teams(&self, stage_id: StageId) -> Result<Vec<(Team, StageTeamLink)>, EngineError> {
        self.store
            .team_links(stage_id)?
            .into_iter()
            .map(|link| Ok((self.store.team(link.team_id)?, link)))
            .collect()
    }
}
