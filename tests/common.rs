//! Common test utilities for building definitions, data, and probe
//! operators.
use ahash::AHashMap;
use cureflow::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The curing-cycle stage catalog used across tests: heating claims warm
/// indices, soaking never fires below 180, cooling needs a falling trend.
#[allow(dead_code)]
pub fn curing_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition {
            id: "heating".to_string(),
            name: "Heating".to_string(),
            expression: "temp > 40 and temp < 180".to_string(),
            priority: None,
        },
        StageDefinition {
            id: "soaking".to_string(),
            name: "Soaking".to_string(),
            expression: "temp >= 180".to_string(),
            priority: None,
        },
        StageDefinition {
            id: "cooling".to_string(),
            name: "Cooling".to_string(),
            expression: "temp < 40 and rate(series) < 0".to_string(),
            priority: None,
        },
    ]
}

/// A strictly increasing temperature ramp.
#[allow(dead_code)]
pub fn ramp_table() -> SeriesTable {
    AHashMap::from([("temp".to_string(), vec![26.0, 31.0, 36.0, 41.0, 46.0])])
}

#[allow(dead_code)]
pub fn thermocouple_groups() -> Vec<GroupDefinition> {
    vec![
        GroupDefinition {
            name: "thermocouples".to_string(),
            columns: vec!["PTC10".to_string(), "PTC11".to_string()],
            data_type: Some("temperature".to_string()),
        },
        GroupDefinition {
            name: "pressure".to_string(),
            columns: vec!["PRESS1".to_string()],
            data_type: Some("pressure".to_string()),
        },
    ]
}

/// Columnar recording with two thermocouples and one pressure sensor.
#[allow(dead_code)]
pub fn recording_table() -> SeriesTable {
    AHashMap::from([
        ("PTC10".to_string(), vec![20.0, 30.0, 40.0, 50.0, 60.0]),
        ("PTC11".to_string(), vec![22.0, 32.0, 42.0, 52.0, 62.0]),
        ("PRESS1".to_string(), vec![1.0, 2.0, 6.0, 7.0, 2.0]),
    ])
}

/// Doubles its `value` input. Used to exercise the executor with a
/// custom registered operator.
#[allow(dead_code)]
pub struct Doubler;

impl Operator for Doubler {
    fn id(&self) -> &str {
        "doubler"
    }

    fn run(&self, inputs: &OperatorInputs) -> OperatorResult {
        match inputs.get("value") {
            Some(DataValue::Number(n)) => {
                OperatorResult::output("value", DataValue::Number(n * 2.0))
            }
            _ => OperatorResult::fail("input 'value' must be a Number"),
        }
    }
}

/// Always reports failure through the normal operator contract.
#[allow(dead_code)]
pub struct AlwaysFails;

impl Operator for AlwaysFails {
    fn id(&self) -> &str {
        "always_fails"
    }

    fn run(&self, _inputs: &OperatorInputs) -> OperatorResult {
        OperatorResult::fail("intentional failure")
    }
}

/// Panics instead of returning, to exercise fault conversion at the
/// executor boundary.
#[allow(dead_code)]
pub struct Panics;

impl Operator for Panics {
    fn id(&self) -> &str {
        "panics"
    }

    fn run(&self, _inputs: &OperatorInputs) -> OperatorResult {
        panic!("operator blew up");
    }
}

/// Counts invocations, to verify that a failed run aborts later steps.
#[allow(dead_code)]
pub struct Probe {
    pub runs: Arc<AtomicUsize>,
}

impl Operator for Probe {
    fn id(&self) -> &str {
        "probe"
    }

    fn run(&self, _inputs: &OperatorInputs) -> OperatorResult {
        self.runs.fetch_add(1, Ordering::SeqCst);
        OperatorResult::output("probed", DataValue::Bool(true))
    }
}

/// Builds a node with string bindings for compact test definitions.
#[allow(dead_code)]
pub fn node(
    id: &str,
    operator: &str,
    inputs: &[(&str, &str)],
    outputs: &[(&str, &str)],
) -> NodeDefinition {
    NodeDefinition {
        id: id.to_string(),
        operator: operator.to_string(),
        inputs: inputs
            .iter()
            .map(|(name, key)| (name.to_string(), key.to_string()))
            .collect(),
        outputs: outputs
            .iter()
            .map(|(name, key)| (name.to_string(), key.to_string()))
            .collect(),
        params: AHashMap::new(),
    }
}
