//! Tests for the contiguous-true-run finder and its duration events.
use ahash::AHashMap;
use cureflow::prelude::*;

#[test]
fn test_timed_scenario() {
    let condition = [false, true, true, false, true];
    let timestamps = [0.0, 60.0, 120.0, 180.0, 240.0];

    let intervals = find_intervals(&condition, Some(&timestamps));
    assert_eq!(
        intervals,
        vec![
            Interval {
                start: 60.0,
                end: 120.0,
                duration: 60.0,
            },
            Interval {
                start: 240.0,
                end: 240.0,
                duration: 0.0,
            },
        ]
    );

    let events = duration_events(&condition, Some(&timestamps));
    assert_eq!(
        events,
        vec![
            DurationEvent {
                timestamp: 60.0,
                value: 60.0,
            },
            DurationEvent {
                timestamp: 240.0,
                value: 0.0,
            },
        ]
    );
}

#[test]
fn test_all_false_yields_nothing() {
    assert!(find_intervals(&[false, false], None).is_empty());
    assert!(find_intervals(&[], None).is_empty());
}

#[test]
fn test_all_true_yields_single_spanning_run() {
    let intervals = find_intervals(&[true, true, true], None);
    assert_eq!(
        intervals,
        vec![Interval {
            start: 0.0,
            end: 120.0,
            duration: 120.0,
        }]
    );
}

#[test]
fn test_synthesized_timestamps_use_default_step() {
    // A run closed by a false transition is valued at run_len * step.
    let intervals = find_intervals(&[true, true, false, true], None);
    assert_eq!(
        intervals,
        vec![
            Interval {
                start: 0.0,
                end: 60.0,
                duration: 120.0,
            },
            Interval {
                start: 180.0,
                end: 180.0,
                duration: 0.0,
            },
        ]
    );
}

#[test]
fn test_short_timestamps_cover_common_prefix() {
    // A timestamp sequence shorter than the condition limits the scan to
    // the indices that have a time coordinate; no panic, no phantom runs.
    let condition = [false, true, true, true, true];
    let timestamps = [0.0, 60.0, 120.0];

    let intervals = find_intervals(&condition, Some(&timestamps));
    assert_eq!(
        intervals,
        vec![Interval {
            start: 60.0,
            end: 120.0,
            duration: 60.0,
        }]
    );
}

#[test]
fn test_coverage_law() {
    // The union of returned spans is exactly the true index set, and no
    // two runs overlap.
    let condition = [true, false, true, true, false, false, true];
    let intervals = find_intervals(&condition, None);

    let mut covered = vec![false; condition.len()];
    let mut last_end = f64::NEG_INFINITY;
    for run in &intervals {
        assert!(run.start > last_end, "runs overlap");
        last_end = run.end;
        let first = (run.start / DEFAULT_STEP) as usize;
        let last = (run.end / DEFAULT_STEP) as usize;
        for index in first..=last {
            covered[index] = true;
        }
    }
    let expected: Vec<bool> = condition.to_vec();
    assert_eq!(covered, expected);
}

#[test]
fn test_sliced_conditions_concatenate_in_order() {
    let slices = vec![vec![true, false], vec![false, true, true]];
    let events = duration_events_sliced(&slices, None, 60.0);
    assert_eq!(
        events,
        vec![
            DurationEvent {
                timestamp: 0.0,
                value: 60.0,
            },
            DurationEvent {
                timestamp: 60.0,
                value: 60.0,
            },
        ]
    );
}

#[test]
fn test_operator_contract() {
    let finder = IntervalFinder::new();

    let mut inputs: OperatorInputs = AHashMap::new();
    inputs.insert(
        "condition".to_string(),
        DataValue::BoolSeries(vec![false, true, true, false, true]),
    );
    inputs.insert(
        "timestamps".to_string(),
        DataValue::Series(vec![0.0, 60.0, 120.0, 180.0, 240.0]),
    );

    let result = finder.run(&inputs);
    assert!(result.success);
    let data = result.data.unwrap();
    match &data["events"] {
        DataValue::Events(events) => {
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].timestamp, 60.0);
            assert_eq!(events[0].value, 60.0);
        }
        other => panic!("unexpected output {:?}", other),
    }
}

#[test]
fn test_operator_rejects_mismatched_timestamps() {
    let finder = IntervalFinder::new();
    let mut inputs: OperatorInputs = AHashMap::new();
    inputs.insert(
        "condition".to_string(),
        DataValue::BoolSeries(vec![true, true]),
    );
    inputs.insert("timestamps".to_string(), DataValue::Series(vec![0.0]));

    let result = finder.run(&inputs);
    assert!(!result.success);
    assert!(result.error.unwrap().contains("'timestamps'"));
}
