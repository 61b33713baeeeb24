use matchlog::{
    config::{MatchConfig, MatchInfo},
    core::{aggregate::Match, error::MatchError},
    event::{CardType, EventDraft, EventPatch, EventPayload, ShotOutcome, ShotType},
    roster::Team,
    types::SportVariant,
};

fn running_match() -> Match {
    let info = MatchInfo::new(Team::new(10, "Ballygunner"), Team::new(20, "Na Piarsaigh"), 0);
    let config = MatchConfig {
        variant: SportVariant::Hurling,
        ..MatchConfig::default()
    };
    let mut m = Match::new(3, info, config);
    m.start_period_at(0).unwrap();
    m
}

#[test]
fn record_yields_monotonic_ids() {
    let mut m = running_match();
    let a = m.record_at(EventDraft::shot(10, ShotOutcome::Point), 1_000).unwrap();
    let b = m.record_at(EventDraft::shot(20, ShotOutcome::Wide), 2_000).unwrap();
    let c = m.record_at(EventDraft::shot(10, ShotOutcome::Goal), 3_000).unwrap();
    assert!(a < b && b < c);
}

#[test]
fn edit_undo_redo_restores_exact_state() {
    let mut m = running_match();
    let id = m
        .record_at(EventDraft::shot(10, ShotOutcome::Wide).by_player(7), 5_000)
        .unwrap();
    let before = m.log().get(id).unwrap().clone();

    let patch = EventPatch {
        shot_outcome: Some(ShotOutcome::Point),
        shot_type: Some(Some(ShotType::FortyFive)),
        annotation: Some(Some("off the hurl".to_string())),
        ..EventPatch::default()
    };
    m.edit(id, &patch).unwrap();
    let after_edit = m.log().get(id).unwrap().clone();
    assert_ne!(after_edit, before);
    assert_eq!(after_edit.period, before.period);
    assert_eq!(after_edit.elapsed_secs, before.elapsed_secs);

    m.undo().unwrap();
    assert_eq!(m.log().get(id).unwrap(), &before);

    m.redo().unwrap();
    assert_eq!(m.log().get(id).unwrap(), &after_edit);
}

#[test]
fn delete_and_undo_restore_record() {
    let mut m = running_match();
    let id = m.record_at(EventDraft::shot(20, ShotOutcome::Goal), 9_000).unwrap();
    let removed = m.delete(id).unwrap();
    assert!(m.log().get(id).is_none());
    assert_eq!(m.score(20).total, 0);

    assert_eq!(m.undo().unwrap(), id);
    assert_eq!(m.log().get(id).unwrap(), &removed);
    assert_eq!(m.score(20).total, 3);
}

#[test]
fn second_delete_reports_not_found_and_changes_nothing() {
    let mut m = running_match();
    let id = m.record_at(EventDraft::shot(10, ShotOutcome::Point), 1_000).unwrap();
    m.delete(id).unwrap();
    let len = m.log().len();
    let undo_len = m.log().undo_len();

    assert_eq!(m.delete(id), Err(MatchError::NotFound(id)));
    assert_eq!(m.log().len(), len);
    assert_eq!(m.log().undo_len(), undo_len);
    assert_eq!(
        m.edit(id, &EventPatch::default()),
        Err(MatchError::NotFound(id))
    );
}

#[test]
fn new_change_clears_redo() {
    let mut m = running_match();
    m.record_at(EventDraft::shot(10, ShotOutcome::Point), 1_000).unwrap();
    m.undo().unwrap();
    assert_eq!(m.log().redo_len(), 1);

    m.record_at(EventDraft::shot(20, ShotOutcome::Point), 2_000).unwrap();
    assert_eq!(m.log().redo_len(), 0);
    assert_eq!(m.redo(), Err(MatchError::NothingToRedo));
}

#[test]
fn clock_events_are_not_undoable_or_editable() {
    let mut m = running_match();
    assert_eq!(m.undo(), Err(MatchError::NothingToUndo));

    let start = m.chronological().next().unwrap().id;
    assert_eq!(m.delete(start), Err(MatchError::ClockEventLocked(start)));
    let patch = EventPatch {
        annotation: Some(Some("throw-in".to_string())),
        ..EventPatch::default()
    };
    assert_eq!(m.edit(start, &patch), Err(MatchError::ClockEventLocked(start)));
}

#[test]
fn edit_rejects_fields_of_another_kind() {
    let mut m = running_match();
    let id = m
        .record_at(
            EventDraft::new(EventPayload::Card { card: CardType::Yellow }).for_team(20),
            4_000,
        )
        .unwrap();
    let patch = EventPatch {
        shot_outcome: Some(ShotOutcome::Goal),
        ..EventPatch::default()
    };
    let err = m.edit(id, &patch).unwrap_err();
    assert!(matches!(err, MatchError::KindMismatch { field: "shot_outcome", .. }));
    assert_eq!(m.log().undo_len(), 1);
}

#[test]
fn edit_to_unknown_team_is_rejected() {
    let mut m = running_match();
    let id = m.record_at(EventDraft::shot(10, ShotOutcome::Point), 1_000).unwrap();
    let patch = EventPatch {
        team: Some(99),
        ..EventPatch::default()
    };
    assert_eq!(m.edit(id, &patch), Err(MatchError::UnknownTeam(99)));
    assert_eq!(m.log().get(id).unwrap().team, Some(10));
}

#[test]
fn edit_can_deselect_player_and_undo_brings_it_back() {
    let mut m = running_match();
    let id = m
        .record_at(
            EventDraft::shot(10, ShotOutcome::Point)
                .by_player(4)
                .annotated("from the sideline"),
            2_000,
        )
        .unwrap();
    let patch = EventPatch {
        player: Some(None),
        annotation: Some(None),
        ..EventPatch::default()
    };
    m.edit(id, &patch).unwrap();
    let rec = m.log().get(id).unwrap();
    assert_eq!(rec.player, None);
    assert_eq!(rec.annotation, None);

    m.undo().unwrap();
    let rec = m.log().get(id).unwrap();
    assert_eq!(rec.player, Some(4));
    assert_eq!(rec.annotation.as_deref(), Some("from the sideline"));
}
