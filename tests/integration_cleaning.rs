//! End-to-end tests: load a fixture file, clean it through a session and
//! verify the audit trail and saved output.

use scour::cleaner::{auto_clean, CleaningSession, Transform};
use scour::cleaner::transform::{DedupStrategy, FormatRule, TextOp};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn load_fixture() -> polars::prelude::DataFrame {
    let path = PathBuf::from("testdata/messy.csv");
    scour::io::load_df(&path).expect("fixture should load")
}

#[test]
fn test_fixture_loads_with_expected_shape() {
    let df = load_fixture();
    assert_eq!(df.height(), 6, "Should have 6 rows");
    assert_eq!(df.width(), 5, "Should have 5 columns");
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    assert!(names.contains(&"id".to_owned()));
    assert!(names.contains(&"email".to_owned()));
}

#[test]
fn test_quality_report_flags_the_planted_problems() {
    let session = CleaningSession::new(load_fixture());
    let report = session.quality().unwrap();
    assert!(report.score < 100.0, "messy fixture should lose points");
    assert!(
        report.issues.iter().any(|i| i.contains("Duplicate rows")),
        "duplicate row should be flagged: {:?}",
        report.issues
    );
    assert!(
        report.issues.iter().any(|i| i.contains("Missing data")),
        "missing cells should be flagged: {:?}",
        report.issues
    );
}

#[test]
fn test_manual_cleaning_pipeline_end_to_end() {
    let mut session = CleaningSession::new(load_fixture());

    let applied = session
        .apply(&Transform::RemoveDuplicates {
            strategy: DedupStrategy::First,
            subset: None,
        })
        .unwrap();
    assert_eq!(applied.record.records_affected, 1);
    assert_eq!(session.data().height(), 5);

    session
        .apply(&Transform::CleanText {
            columns: vec!["name".to_string()],
            operations: vec![TextOp::RemoveExtraSpaces, TextOp::RemoveSpecialChars],
        })
        .unwrap();
    let names: Vec<Option<&str>> = session
        .data()
        .column("name")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .iter()
        .collect();
    assert!(names.contains(&Some("Alice")));
    assert!(names.contains(&Some("Charlie")));

    let mut rules = BTreeMap::new();
    rules.insert("email".to_string(), FormatRule::Email);
    session
        .apply(&Transform::StandardizeFormats { rules })
        .unwrap();
    let emails: Vec<Option<&str>> = session
        .data()
        .column("email")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .iter()
        .collect();
    assert!(emails.contains(&Some("alice@example.com")));

    // Audit trail: initial state plus three operations, all undoable.
    assert_eq!(session.operations().len(), 4);
    session.undo().unwrap();
    session.undo().unwrap();
    session.undo().unwrap();
    assert_eq!(session.data().height(), 6);
}

#[test]
fn test_auto_clean_then_save_round_trips() {
    let mut session = CleaningSession::new(load_fixture());
    let report = auto_clean(&mut session, false).unwrap();

    assert_eq!(report.rows_before, 6);
    assert!(report.rows_after < report.rows_before, "dup row should go");
    assert!(!report.issues_fixed.is_empty());

    let out = std::env::temp_dir().join(format!("scour-it-{}.csv", session.id()));
    let mut cleaned = session.data().clone();
    scour::io::save_df(&mut cleaned, &out).expect("save should succeed");

    let reloaded = scour::io::load_df(&out).expect("reload should succeed");
    assert_eq!(reloaded.height(), report.rows_after);
    assert_eq!(reloaded.width(), report.columns_after);
    std::fs::remove_file(&out).ok();
}
