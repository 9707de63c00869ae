use super::{Operator, OperatorInputs, OperatorResult, require_input};
use crate::data::{DataValue, DurationEvent};

/// Step used when no timestamp sequence is supplied: synthesized
/// timestamps are `0, 60, 120, ...`.
pub const DEFAULT_STEP: f64 = 60.0;

/// A maximal contiguous span where a boolean condition held true.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// Scans a boolean sequence for maximal contiguous true-runs.
///
/// With real timestamps a run's duration is `end - start`. With
/// synthesized timestamps a run closed by a false transition gets
/// `run_len * step`; a run still open at sequence end is closed at the
/// last index with `end - start` (0 for a single trailing true).
///
/// `timestamps`, when supplied, should have the same length as
/// `condition`; if it is shorter, the scan covers the common prefix, as
/// indices past the timestamp sequence have no time coordinate.
pub fn find_intervals(condition: &[bool], timestamps: Option<&[f64]>) -> Vec<Interval> {
    find_intervals_with_step(condition, timestamps, DEFAULT_STEP)
}

pub fn find_intervals_with_step(
    condition: &[bool],
    timestamps: Option<&[f64]>,
    step: f64,
) -> Vec<Interval> {
    let len = match timestamps {
        Some(t) => condition.len().min(t.len()),
        None => condition.len(),
    };
    let condition = &condition[..len];

    let ts = |i: usize| -> f64 {
        match timestamps {
            Some(t) => t[i],
            None => i as f64 * step,
        }
    };

    let mut intervals = Vec::new();
    let mut open: Option<usize> = None;

    for (i, &on) in condition.iter().enumerate() {
        match (open, on) {
            (None, true) => open = Some(i),
            (Some(j), false) => {
                let end = ts(i - 1);
                let duration = match timestamps {
                    Some(_) => end - ts(j),
                    None => (i - j) as f64 * step,
                };
                intervals.push(Interval {
                    start: ts(j),
                    end,
                    duration,
                });
                open = None;
            }
            _ => {}
        }
    }

    if let Some(j) = open {
        let last = condition.len() - 1;
        intervals.push(Interval {
            start: ts(j),
            end: ts(last),
            duration: ts(last) - ts(j),
        });
    }

    intervals
}

/// Normalizes runs into the public sparse duration-event form: one point
/// per run at the run's start, valued with its duration.
pub fn duration_events(condition: &[bool], timestamps: Option<&[f64]>) -> Vec<DurationEvent> {
    duration_events_with_step(condition, timestamps, DEFAULT_STEP)
}

pub fn duration_events_with_step(
    condition: &[bool],
    timestamps: Option<&[f64]>,
    step: f64,
) -> Vec<DurationEvent> {
    find_intervals_with_step(condition, timestamps, step)
        .into_iter()
        .map(|run| DurationEvent {
            timestamp: run.start,
            value: run.duration,
        })
        .collect()
}

/// Runs the finder independently per slice of a multi-dimensional
/// condition and concatenates the results in slice order.
pub fn duration_events_sliced(
    slices: &[Vec<bool>],
    timestamps: Option<&[f64]>,
    step: f64,
) -> Vec<DurationEvent> {
    slices
        .iter()
        .flat_map(|slice| duration_events_with_step(slice, timestamps, step))
        .collect()
}

/// Workflow operator wrapping the finder.
///
/// Inputs: `condition` (BoolSeries), optional `timestamps` (Series).
/// Output: `events` (Events).
pub struct IntervalFinder {
    step: f64,
}

impl IntervalFinder {
    pub fn new() -> Self {
        Self { step: DEFAULT_STEP }
    }

    pub fn with_step(step: f64) -> Self {
        Self { step }
    }
}

impl Default for IntervalFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for IntervalFinder {
    fn id(&self) -> &str {
        "interval_finder"
    }

    fn run(&self, inputs: &OperatorInputs) -> OperatorResult {
        let condition = match require_input(inputs, "condition") {
            Ok(v) => match v.as_bool_series() {
                Some(s) => s,
                None => {
                    return OperatorResult::fail(format!(
                        "input 'condition' must be a BoolSeries, found {}",
                        v.type_name()
                    ));
                }
            },
            Err(e) => return OperatorResult::fail(e),
        };

        let timestamps = match inputs.get("timestamps") {
            Some(v) => match v.as_series() {
                Some(s) => Some(s),
                None => {
                    return OperatorResult::fail(format!(
                        "input 'timestamps' must be a Series, found {}",
                        v.type_name()
                    ));
                }
            },
            None => None,
        };

        if let Some(ts) = timestamps {
            if ts.len() != condition.len() {
                return OperatorResult::fail(format!(
                    "'timestamps' has {} entries but 'condition' has {}",
                    ts.len(),
                    condition.len()
                ));
            }
        }

        let events = duration_events_with_step(condition, timestamps, self.step);
        OperatorResult::output("events", DataValue::Events(events))
    }
}
