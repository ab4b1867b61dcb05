//! Tests for trial-wise and cell-wise attach.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Array3};
use polars::prelude::{AnyValue, Column, DataFrame, NamedFrom, Series};
use proptest::prelude::*;

use holo_core::{HoloFrame, VolumeOptions};
use holo_model::{AttachOptions, ErrorKind, HoloError, JoinKey, ReplacePolicy};

fn blank_frame(cells: usize, trials: usize, timepoints: usize) -> HoloFrame {
    let traces = Array3::<f64>::zeros((cells, trials, timepoints));
    HoloFrame::from_traces(traces.view(), VolumeOptions::new()).unwrap()
}

fn column_strings(frame: &HoloFrame, name: &str) -> Vec<Option<String>> {
    let column = frame.data().column(name).unwrap();
    (0..column.len())
        .map(|idx| match column.get(idx).unwrap() {
            AnyValue::Null => None,
            value => Some(holo_common::any_to_string(value)),
        })
        .collect()
}

#[test]
fn trialwise_values_broadcast_to_trial_rows() {
    let mut frame = blank_frame(2, 3, 2);
    frame
        .add_trialwise(vec![0.5, 1.0, 2.0], &AttachOptions::named("contrast"))
        .unwrap();

    let trials = frame.data().column("trial").unwrap().i64().unwrap();
    let contrast = frame.data().column("contrast").unwrap().f64().unwrap();
    for idx in 0..frame.height() {
        let expected = [0.5, 1.0, 2.0][trials.get(idx).unwrap() as usize];
        assert_eq!(contrast.get(idx), Some(expected));
    }
}

#[test]
fn cellwise_mapping_adds_one_column_per_entry() {
    let mut mapping = BTreeMap::new();
    mapping.insert("depth".to_string(), Series::new("".into(), &[120.0, 340.0]));
    mapping.insert("layer".to_string(), Series::new("".into(), &["L2/3", "L5"]));

    let frame = blank_frame(2, 1, 2)
        .with_cellwise(mapping, &AttachOptions::new())
        .unwrap();
    assert_eq!(
        frame.column_names(),
        vec!["cell", "trial", "time", "value", "depth", "layer"]
    );
    let layer = column_strings(&frame, "layer");
    assert_eq!(layer[0].as_deref(), Some("L2/3"));
    assert_eq!(layer[3].as_deref(), Some("L5"));
}

#[test]
fn positional_units_follow_sorted_keys() {
    // Trial ids out of order in the table still map to ascending positions.
    let df = DataFrame::new(vec![
        Column::new("cell".into(), &[0i64, 0, 0]),
        Column::new("trial".into(), &[30i64, 10, 20]),
        Column::new("time".into(), &[0i64, 0, 0]),
        Column::new("value".into(), &[0.0, 0.0, 0.0]),
    ])
    .unwrap();
    let frame = HoloFrame::try_new(df)
        .unwrap()
        .with_trialwise(vec!["a", "b", "c"], &AttachOptions::named("block"))
        .unwrap();
    let block = column_strings(&frame, "block");
    assert_eq!(
        block,
        vec![Some("c".into()), Some("a".into()), Some("b".into())]
    );
}

#[test]
fn explicit_key_table_leaves_unmatched_rows_null() {
    let annotation = DataFrame::new(vec![
        Column::new("cell".into(), &[1i64, 9]),
        Column::new("responsive".into(), &[true, false]),
    ])
    .unwrap();
    let frame = blank_frame(2, 1, 1)
        .with_cellwise(annotation, &AttachOptions::new())
        .unwrap();
    let responsive = frame.data().column("responsive").unwrap().bool().unwrap();
    let got: Vec<_> = responsive.into_iter().collect();
    assert_eq!(got, vec![None, Some(true)]);
}

#[test]
fn reject_leaves_table_unchanged() {
    let mut frame = blank_frame(2, 2, 2);
    frame
        .add_cellwise(vec![1i64, 2], &AttachOptions::named("depth"))
        .unwrap();
    let before = frame.data().clone();

    // Cell-wise attach rejects by default.
    let err = frame
        .add_cellwise(vec![3i64, 4], &AttachOptions::named("depth"))
        .unwrap_err();
    assert!(matches!(err, HoloError::DuplicateColumn { ref columns } if columns == &["depth"]));
    assert!(frame.data().equals_missing(&before));

    // Trial-wise attach rejects when asked to.
    frame
        .add_trialwise(vec!["x", "y"], &AttachOptions::named("stim"))
        .unwrap();
    let before = frame.data().clone();
    let options = AttachOptions::named("stim").with_replace(false);
    let err = frame.add_trialwise(vec!["p", "q"], &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateColumn);
    assert!(frame.data().equals_missing(&before));
}

#[test]
fn replace_overwrites_in_place() {
    let mut frame = blank_frame(2, 2, 2);
    frame
        .add_trialwise(vec!["x", "y"], &AttachOptions::named("stim"))
        .unwrap()
        .add_cellwise(vec![10i64, 20], &AttachOptions::named("depth"))
        .unwrap();
    let before = frame.data().clone();

    // Trial-wise attach replaces by default.
    frame
        .add_trialwise(vec!["p", "q"], &AttachOptions::named("stim"))
        .unwrap();
    let options = AttachOptions::named("depth").with_replace(ReplacePolicy::Replace);
    frame.add_cellwise(vec![11i64, 21], &options).unwrap();

    assert_eq!(frame.height(), before.height());
    for name in ["cell", "trial", "time", "value"] {
        let after = frame.data().column(name).unwrap().as_materialized_series();
        assert!(after.equals_missing(before.column(name).unwrap().as_materialized_series()));
    }
    assert_eq!(column_strings(&frame, "stim")[2].as_deref(), Some("p"));
    assert_eq!(column_strings(&frame, "depth")[2].as_deref(), Some("21"));
}

#[test]
fn cardinality_mismatch_fails_before_mutation() {
    let mut frame = blank_frame(1, 6, 2);
    let before = frame.data().clone();
    let err = frame
        .add_trialwise(vec![1.0; 5], &AttachOptions::named("speed"))
        .unwrap_err();
    match &err {
        HoloError::Cardinality {
            key,
            expected,
            actual,
        } => {
            assert_eq!(*key, JoinKey::Trial);
            assert_eq!((*expected, *actual), (6, 5));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("number of trials (6)"));
    assert!(frame.data().equals_missing(&before));
}

#[test]
fn invalid_inputs_report_their_kind() {
    let frame = blank_frame(2, 2, 1);

    let err = frame
        .with_trialwise(AnyValue::Int64(3), &AttachOptions::named("x"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);

    let grid = Array2::<f64>::zeros((2, 2)).into_dyn();
    let err = frame
        .with_trialwise(grid, &AttachOptions::named("x"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);

    let err = frame
        .with_cellwise(Array1::from(vec![1.0, 2.0]), &AttachOptions::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingName);
}

proptest! {
    #[test]
    fn attach_then_read_back(
        (cells, values) in (1usize..4, 1usize..7).prop_flat_map(|(cells, trials)| {
            (Just(cells), prop::collection::vec(-1.0e6f64..1.0e6, trials))
        }),
        timepoints in 1usize..4,
    ) {
        let mut frame = blank_frame(cells, values.len(), timepoints);
        frame.add_trialwise(values.clone(), &AttachOptions::named("x")).unwrap();

        let trials = frame.data().column("trial").unwrap().i64().unwrap();
        let attached = frame.data().column("x").unwrap().f64().unwrap();
        prop_assert_eq!(frame.height(), cells * values.len() * timepoints);
        for idx in 0..frame.height() {
            let trial = trials.get(idx).unwrap() as usize;
            prop_assert_eq!(attached.get(idx), Some(values[trial]));
        }
    }
}
