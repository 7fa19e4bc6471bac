//! Session-level history properties.

use crate::cleaner::transform::*;
use crate::cleaner::CleaningSession;
use crate::report::DefaultReporter;
use polars::prelude::*;

fn frame() -> DataFrame {
    df! {
        "id" => [1i64, 2, 2, 3, 3, 3],
        "name" => ["  a ", "b", "b", "c", "c", "c"],
    }
    .unwrap()
}

fn drop_one_dup() -> Transform {
    Transform::RemoveDuplicates {
        strategy: DedupStrategy::First,
        subset: None,
    }
}

#[test]
fn test_undo_redo_round_trip_is_bit_for_bit() {
    let mut session = CleaningSession::new(frame());
    let transforms = vec![
        drop_one_dup(),
        Transform::CleanText {
            columns: vec!["name".to_string()],
            operations: vec![TextOp::RemoveExtraSpaces, TextOp::Uppercase],
        },
        Transform::RenameColumns {
            mapping: [("name".to_string(), "label".to_string())]
                .into_iter()
                .collect(),
        },
    ];
    for t in &transforms {
        session.apply(t).unwrap();
    }
    let final_state = session.data().clone();

    for _ in 0..transforms.len() {
        session.undo().unwrap();
    }
    assert!(session.data().equals_missing(&frame()));

    for _ in 0..transforms.len() {
        session.redo().unwrap();
    }
    assert!(session.data().equals_missing(&final_state));
}

#[test]
fn test_history_bound_holds_under_many_appends() {
    let mut session =
        CleaningSession::with_capacity(frame(), 4, Box::new(DefaultReporter));
    for _ in 0..10 {
        // Alternating no-op-ish transforms still append records.
        session
            .apply(&Transform::CleanText {
                columns: vec!["name".to_string()],
                operations: vec![TextOp::Lowercase],
            })
            .unwrap();
    }
    let history = session.history();
    assert_eq!(history.len(), 4);
    assert!(history.cursor() <= history.len());
}

#[test]
fn test_undo_floor_rises_after_eviction() {
    let mut session =
        CleaningSession::with_capacity(frame(), 2, Box::new(DefaultReporter));
    for _ in 0..5 {
        session
            .apply(&Transform::CleanText {
                columns: vec!["name".to_string()],
                operations: vec![TextOp::Lowercase],
            })
            .unwrap();
    }
    // One undo reaches the oldest retained snapshot; a second must fail
    // rather than clamp to some other state.
    session.undo().unwrap();
    assert!(!session.can_undo());
    assert!(session.undo().is_err());
}

#[test]
fn test_reset_restores_the_original_row_for_row() {
    let mut session = CleaningSession::new(frame());
    session.apply(&drop_one_dup()).unwrap();
    session
        .apply(&Transform::DropColumns {
            columns: vec!["name".to_string()],
        })
        .unwrap();
    assert_ne!(session.data().height(), frame().height());

    session.reset();
    assert!(session.data().equals_missing(&frame()));
    assert!(!session.can_redo());
    // The reset ledger behaves like a fresh one: one no-op undo to the
    // original is still available, then the floor.
    assert!(session.can_undo());
    assert!(session.undo().unwrap().equals_missing(&frame()));
    assert!(session.undo().is_err());
}

#[test]
fn test_appending_after_undo_discards_the_redo_branch() {
    let mut session = CleaningSession::new(frame());
    session.apply(&drop_one_dup()).unwrap();
    session
        .apply(&Transform::DropColumns {
            columns: vec!["name".to_string()],
        })
        .unwrap();
    session.undo().unwrap();
    assert!(session.can_redo());

    session
        .apply(&Transform::RenameColumns {
            mapping: [("name".to_string(), "label".to_string())]
                .into_iter()
                .collect(),
        })
        .unwrap();
    assert!(!session.can_redo());
    let kinds: Vec<&str> = session
        .operations()
        .iter()
        .map(|op| op.kind.as_str())
        .collect();
    assert_eq!(
        kinds,
        vec!["initial_state", "remove_duplicates", "rename_columns"]
    );
}

#[test]
fn test_scenario_from_the_field() {
    // Duplicate ids, one null, walked through dedup, drop, undo, redo, reset.
    let df = df! {
        "id" => [1i64, 2, 2, 3],
        "val" => [None, Some("b"), Some("b"), Some("c")],
    }
    .unwrap();
    let mut session = CleaningSession::new(df.clone());

    let applied = session.apply(&drop_one_dup()).unwrap();
    assert_eq!(session.data().height(), 3);
    assert_eq!(applied.record.records_affected, 1);

    session
        .apply(&Transform::HandleMissingValues {
            strategy: MissingStrategy::Drop,
            columns: Some(vec!["val".to_string()]),
            fill_value: None,
        })
        .unwrap();
    assert_eq!(session.data().height(), 2);

    session.undo().unwrap();
    assert_eq!(session.data().height(), 3);
    session.redo().unwrap();
    assert_eq!(session.data().height(), 2);

    session.reset();
    assert_eq!(session.data().height(), 4);
    assert!(session.data().equals_missing(&df));
}
