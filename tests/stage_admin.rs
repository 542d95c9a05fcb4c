//! Integration tests for stage setup, roster import, clear, finals trigger and snapshots.

mod common;

use common::{date, drawn_stage, harness, harness_with_finals, stage_with_teams, FixedFinals};
use tournament_engine_web::{
    select_current_stage, ClearSummary, EngineError, Group, MemoryStore, RecordEventRequest,
    Repository, ScheduleOptions, Stage, StageKind, StageStatus,
};
use uuid::Uuid;

#[test]
fn csv_roster_is_imported_in_file_order() {
    let h = harness();
    let stage = h
        .engine
        .create_stage("football 7", "Summer League", StageKind::League, date(2026, 6, 1), "Park")
        .unwrap();
    let csv = "name,city\nLions, Porto\nHawks,Braga\nOwls,\n";
    let links = h.engine.import_roster_csv(stage.id, csv.as_bytes()).unwrap();
    assert_eq!(links.len(), 3);

    let teams = h.engine.stage_teams(stage.id).unwrap();
    let names: Vec<&str> = teams.iter().map(|(t, _)| t.name.as_str()).collect();
    assert_eq!(names, vec!["Lions", "Hawks", "Owls"]);
    assert_eq!(teams[0].0.city, "Porto");
    assert!(teams
        .iter()
        .all(|(_, l)| l.group == Group::A && l.draw_order.is_none()));
}

#[test]
fn csv_roster_with_blank_name_imports_nothing() {
    let h = harness();
    let (stage_id, _) = stage_with_teams(&h, 0);
    let csv = "name,city\nLions,Porto\n,Braga\n";
    assert!(matches!(
        h.engine.import_roster_csv(stage_id, csv.as_bytes()),
        Err(EngineError::Validation(_))
    ));
    assert!(h.engine.stage_teams(stage_id).unwrap().is_empty());
}

#[test]
fn team_links_are_unique_per_stage() {
    let h = harness();
    let (stage_id, teams) = stage_with_teams(&h, 1);
    assert!(matches!(
        h.engine.link_team(stage_id, teams[0]),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        h.engine.import_team(stage_id, "   ", "Faro"),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn removing_a_team_unlinks_it() {
    let h = harness();
    let (stage_id, teams) = stage_with_teams(&h, 3);
    h.engine.remove_team(stage_id, teams[1]).unwrap();
    let remaining: Vec<_> = h
        .engine
        .stage_teams(stage_id)
        .unwrap()
        .into_iter()
        .map(|(t, _)| t.id)
        .collect();
    assert_eq!(remaining, vec![teams[0], teams[2]]);
    assert!(matches!(
        h.engine.remove_team(stage_id, teams[1]),
        Err(EngineError::NotFound { .. })
    ));
}

#[test]
fn clear_stage_cascades_but_keeps_the_stage() {
    let h = harness();
    let (stage_id, _, _) = drawn_stage(&h, 2, 2);
    h.engine
        .generate_group_schedule(stage_id, ScheduleOptions::default())
        .unwrap();
    let m = h.engine.list_matches(stage_id).unwrap().remove(0);
    h.engine
        .record_match_event(RecordEventRequest::new(m.id, m.team_a.unwrap(), "GOAL"))
        .unwrap();

    let summary = h.engine.clear_stage(stage_id).unwrap();
    assert_eq!(
        summary,
        ClearSummary {
            links_removed: 4,
            matches_removed: 4,
            events_removed: 1,
        }
    );
    assert!(h.engine.list_matches(stage_id).unwrap().is_empty());
    assert!(h.engine.stage_teams(stage_id).unwrap().is_empty());
    assert!(h.engine.store().stage(stage_id).is_ok());
    assert!(matches!(
        h.engine.list_events(m.id),
        Err(EngineError::NotFound { .. })
    ));
}

#[test]
fn current_stage_prefers_in_progress_then_latest() {
    let mut early = Stage::new("futsal", "Early", StageKind::League, date(2026, 1, 10), "A");
    let late = Stage::new("futsal", "Late", StageKind::Knockout, date(2026, 5, 10), "B");
    assert_eq!(select_current_stage(&[]), None);
    assert_eq!(
        select_current_stage(&[early.clone(), late.clone()]).map(|s| s.id),
        Some(late.id)
    );
    early.status = StageStatus::InProgress;
    assert_eq!(
        select_current_stage(&[early.clone(), late.clone()]).map(|s| s.id),
        Some(early.id)
    );
}

#[test]
fn current_stage_follows_status_changes() {
    let h = harness();
    let (first, _) = stage_with_teams(&h, 0);
    let second = h
        .engine
        .create_stage("futsal", "Autumn Cup", StageKind::League, date(2026, 9, 1), "Arena")
        .unwrap();
    assert_eq!(h.engine.current_stage().unwrap().map(|s| s.id), Some(second.id));

    h.engine.set_stage_status(first, StageStatus::InProgress).unwrap();
    assert_eq!(h.engine.current_stage().unwrap().map(|s| s.id), Some(first));
}

#[test]
fn finals_trigger_forwards_delegate_result() {
    let h = harness_with_finals(Box::new(FixedFinals(Ok(4))));
    let (stage_id, _) = stage_with_teams(&h, 4);
    let before = h.standings.revision(stage_id);
    let summary = h.engine.trigger_finals(stage_id, date(2026, 4, 30)).unwrap();
    assert_eq!(summary.matches_created, 4);
    assert_eq!(h.standings.revision(stage_id), before + 1);
}

#[test]
fn finals_failure_is_surfaced_verbatim() {
    let h = harness_with_finals(Box::new(FixedFinals(Err("bracket needs 8 teams".to_string()))));
    let (stage_id, _) = stage_with_teams(&h, 4);
    let err = h.engine.trigger_finals(stage_id, date(2026, 4, 30)).unwrap_err();
    assert_eq!(err, EngineError::DelegateFailed("bracket needs 8 teams".to_string()));
    assert_eq!(err.to_string(), "bracket needs 8 teams");
    assert_eq!(err.code(), "DELEGATE_FAILED");
}

#[test]
fn finals_for_unknown_stage_is_not_found() {
    let h = harness_with_finals(Box::new(FixedFinals(Ok(2))));
    assert!(matches!(
        h.engine.trigger_finals(Uuid::new_v4(), date(2026, 4, 30)),
        Err(EngineError::NotFound { entity: "stage", .. })
    ));
}

#[test]
fn snapshot_restores_matches_and_events() {
    let h = harness();
    let (stage_id, _, _) = drawn_stage(&h, 2, 2);
    h.engine
        .generate_group_schedule(stage_id, ScheduleOptions::default())
        .unwrap();
    let m = h.engine.list_matches(stage_id).unwrap().remove(0);
    h.engine
        .record_match_event(RecordEventRequest::new(m.id, m.team_b.unwrap(), "yellow card"))
        .unwrap();

    let json = h.engine.store().snapshot().unwrap();
    let restored = MemoryStore::from_snapshot(&json).unwrap();
    assert_eq!(
        restored.matches(stage_id).unwrap(),
        h.engine.store().matches(stage_id).unwrap()
    );
    assert_eq!(restored.events(m.id).unwrap(), h.engine.list_events(m.id).unwrap());
    assert!(MemoryStore::from_snapshot("not json").is_err());
}

#[test]
fn only_store_errors_are_transient() {
    assert!(EngineError::StoreUnavailable("lock error".to_string()).is_transient());
    assert!(!EngineError::NoMatches.is_transient());
    assert_eq!(EngineError::NoMatches.code(), "NO_MATCHES");
    assert_eq!(EngineError::EmptyGroup(Group::B).code(), "EMPTY_GROUP");
    assert_eq!(
        EngineError::InsufficientTeams { found: 1 }.code(),
        "INSUFFICIENT_TEAMS"
    );
}
