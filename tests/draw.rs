//! Integration tests for the group draw: random partition and manual commit.

mod common;

use common::{harness, stage_with_teams};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tournament_engine_web::{
    partition_teams, DrawAssignment, EngineError, Group, Repository, TeamId,
};
use uuid::Uuid;

#[test]
fn draw_requires_at_least_2_teams() {
    let h = harness();
    let (stage_id, _) = stage_with_teams(&h, 1);
    assert_eq!(
        h.engine.draw(stage_id),
        Err(EngineError::InsufficientTeams { found: 1 })
    );
}

#[test]
fn partition_is_a_permutation_split_in_half() {
    for n in 2usize..=11 {
        let teams: Vec<TeamId> = (0..n).map(|_| Uuid::new_v4()).collect();
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = partition_teams(&teams, &mut rng).unwrap();
            assert_eq!(result.group_a.len(), n.div_ceil(2));
            assert_eq!(result.group_a.len() + result.group_b.len(), n);

            let drawn: HashSet<TeamId> = result
                .group_a
                .iter()
                .chain(result.group_b.iter())
                .copied()
                .collect();
            assert_eq!(drawn.len(), n, "no team may appear twice");
            assert_eq!(drawn, teams.iter().copied().collect::<HashSet<_>>());
        }
    }
}

#[test]
fn draw_persists_groups_with_contiguous_orders() {
    let h = harness();
    let (stage_id, _) = stage_with_teams(&h, 5);
    let mut rng = StdRng::seed_from_u64(7);
    let result = h.engine.draw_with_rng(stage_id, &mut rng).unwrap();
    assert_eq!(result.group_a.len(), 3);
    assert_eq!(result.group_b.len(), 2);

    assert_eq!(h.engine.groups(stage_id).unwrap(), result);

    let links = h.engine.store().team_links(stage_id).unwrap();
    for (group, expected) in [(Group::A, vec![1, 2, 3]), (Group::B, vec![1, 2])] {
        let mut orders: Vec<u32> = links
            .iter()
            .filter(|l| l.group == group)
            .map(|l| l.draw_order.unwrap())
            .collect();
        orders.sort();
        assert_eq!(orders, expected);
    }
}

#[test]
fn redraw_overwrites_previous_draw() {
    let h = harness();
    let (stage_id, teams) = stage_with_teams(&h, 6);
    h.engine.draw_with_rng(stage_id, &mut StdRng::seed_from_u64(1)).unwrap();
    let second = h.engine.draw_with_rng(stage_id, &mut StdRng::seed_from_u64(2)).unwrap();
    assert_eq!(h.engine.groups(stage_id).unwrap(), second);
    assert_eq!(h.engine.store().team_links(stage_id).unwrap().len(), teams.len());
}

#[test]
fn manual_draw_is_idempotent() {
    let h = harness();
    let (stage_id, teams) = stage_with_teams(&h, 4);
    let assignments = vec![
        DrawAssignment { team_id: teams[2], group: Group::A, order: 1 },
        DrawAssignment { team_id: teams[0], group: Group::A, order: 2 },
        DrawAssignment { team_id: teams[3], group: Group::B, order: 1 },
        DrawAssignment { team_id: teams[1], group: Group::B, order: 2 },
    ];
    assert_eq!(h.engine.apply_manual_draw(stage_id, &assignments).unwrap(), 4);
    let first = h.engine.store().team_links(stage_id).unwrap();
    assert_eq!(h.engine.apply_manual_draw(stage_id, &assignments).unwrap(), 4);
    let second = h.engine.store().team_links(stage_id).unwrap();

    assert_eq!(first, second);
    let groups = h.engine.groups(stage_id).unwrap();
    assert_eq!(groups.group_a, vec![teams[2], teams[0]]);
    assert_eq!(groups.group_b, vec![teams[3], teams[1]]);
}

#[test]
fn manual_draw_rejects_team_from_outside_the_stage() {
    let h = harness();
    let (stage_id, teams) = stage_with_teams(&h, 2);
    let assignments = vec![
        DrawAssignment { team_id: teams[0], group: Group::B, order: 1 },
        DrawAssignment { team_id: Uuid::new_v4(), group: Group::A, order: 1 },
    ];
    let err = h.engine.apply_manual_draw(stage_id, &assignments).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_FAILED");

    // Nothing from the rejected batch was applied.
    let links = h.engine.store().team_links(stage_id).unwrap();
    assert!(links.iter().all(|l| l.group == Group::A && l.draw_order.is_none()));
}

#[test]
fn manual_draw_rejects_duplicate_team() {
    let h = harness();
    let (stage_id, teams) = stage_with_teams(&h, 2);
    let assignments = vec![
        DrawAssignment { team_id: teams[0], group: Group::A, order: 1 },
        DrawAssignment { team_id: teams[0], group: Group::B, order: 1 },
    ];
    assert!(matches!(
        h.engine.apply_manual_draw(stage_id, &assignments),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn draw_invalidates_both_projections() {
    let h = harness();
    let (stage_id, _) = stage_with_teams(&h, 4);
    let live_before = h.live.revision(stage_id);
    let standings_before = h.standings.revision(stage_id);
    h.engine.draw(stage_id).unwrap();
    assert_eq!(h.live.revision(stage_id), live_before + 1);
    assert_eq!(h.standings.revision(stage_id), standings_before + 1);
}
