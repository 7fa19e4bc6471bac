//! Cross-operation properties of the transform library.

use crate::cleaner::transform::*;
use crate::error::Result;
use polars::prelude::*;

fn messy() -> DataFrame {
    df! {
        "id" => [1i64, 2, 2, 3],
        "val" => ["a", "b", "b", "c"],
    }
    .unwrap()
}

#[test]
fn test_dedup_is_idempotent_after_other_transforms() -> Result<()> {
    let dedup = Transform::RemoveDuplicates {
        strategy: DedupStrategy::First,
        subset: None,
    };
    let lower = Transform::CleanText {
        columns: vec!["val".to_string()],
        operations: vec![TextOp::Lowercase],
    };

    let once = dedup.apply(&lower.apply(&messy())?.df)?;
    let twice = dedup.apply(&once.df)?;
    assert_eq!(twice.records_affected, 0);
    assert!(once.df.equals(&twice.df));
    Ok(())
}

#[test]
fn test_fill_strategies_reduce_nulls_monotonically() -> Result<()> {
    let strategies = [
        MissingStrategy::Drop,
        MissingStrategy::FillMean,
        MissingStrategy::FillMedian,
        MissingStrategy::FillMode,
        MissingStrategy::FillCustom,
    ];
    for strategy in strategies {
        let df = df! {
            "n" => [Some(1.0f64), None, Some(3.0), None],
        }
        .unwrap();
        let before = df.column("n").unwrap().null_count();
        let t = Transform::HandleMissingValues {
            strategy,
            columns: None,
            fill_value: Some(FillValue::Number(0.0)),
        };
        let out = t.apply(&df)?;
        let after = out.df.column("n").unwrap().null_count();
        assert!(
            after <= before,
            "{} grew the null count",
            strategy.as_str()
        );
    }
    Ok(())
}

#[test]
fn test_no_surviving_row_is_an_outlier() -> Result<()> {
    let df = df! {
        "v" => [10.0f64, 11.0, 12.0, 11.5, 10.5, 1000.0, -900.0],
    }
    .unwrap();
    let t = Transform::RemoveOutliers {
        columns: vec!["v".to_string()],
        method: OutlierMethod::Iqr,
        threshold: 1.5,
    };
    let out = t.apply(&df)?;
    assert!(out.df.height() < df.height());

    // Survivors must sit inside the fences computed over the original data.
    let ca = df.column("v").unwrap().as_materialized_series().f64().unwrap();
    let q1 = ca.quantile(0.25, QuantileMethod::Linear)?.unwrap();
    let q3 = ca.quantile(0.75, QuantileMethod::Linear)?.unwrap();
    let iqr = q3 - q1;
    let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    for v in out.df.column("v").unwrap().as_materialized_series().f64().unwrap().iter().flatten() {
        assert!(v >= lo && v <= hi, "row {v} should have been removed");
    }
    Ok(())
}

#[test]
fn test_transforms_never_mutate_their_input() -> Result<()> {
    let df = messy();
    let before = df.clone();
    Transform::RemoveDuplicates {
        strategy: DedupStrategy::All,
        subset: None,
    }
    .apply(&df)?;
    Transform::CleanText {
        columns: vec!["val".to_string()],
        operations: vec![TextOp::Uppercase],
    }
    .apply(&df)?;
    assert!(df.equals_missing(&before));
    Ok(())
}

#[test]
fn test_convert_then_outliers_composes() -> Result<()> {
    let df = df! {
        "amount" => ["10", "11", "12", "9000"],
    }
    .unwrap();
    let mut mapping = std::collections::BTreeMap::new();
    mapping.insert("amount".to_string(), TargetType::Numeric);
    let converted = Transform::ConvertDataTypes { mapping }.apply(&df)?;
    assert!(converted.df.column("amount").unwrap().dtype().is_numeric());

    let out = Transform::RemoveOutliers {
        columns: vec!["amount".to_string()],
        method: OutlierMethod::Iqr,
        threshold: 1.5,
    }
    .apply(&converted.df)?;
    assert_eq!(out.df.height(), 3);
    Ok(())
}

#[test]
fn test_unknown_columns_fail_before_touching_data() {
    let df = messy();
    let cases = vec![
        Transform::CleanText {
            columns: vec!["ghost".to_string()],
            operations: vec![TextOp::Lowercase],
        },
        Transform::RemoveOutliers {
            columns: vec!["ghost".to_string()],
            method: OutlierMethod::Zscore,
            threshold: 3.0,
        },
        Transform::DropColumns {
            columns: vec!["ghost".to_string()],
        },
        Transform::ReorderColumns {
            order: vec!["ghost".to_string()],
        },
    ];
    for t in cases {
        assert!(t.apply(&df).is_err(), "{} accepted a ghost column", t.kind());
    }
}
