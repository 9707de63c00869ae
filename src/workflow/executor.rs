use super::builder::CompiledWorkflow;
use crate::data::DataValue;
use crate::ops::OperatorInputs;
use ahash::AHashMap;
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The single mutable mapping threaded through one workflow run.
///
/// Created fresh per execution, seeded with the caller's parameters, and
/// discarded (or partially returned as the result payload) at run end.
#[derive(Debug, Default)]
pub struct DataContext {
    values: AHashMap<String, DataValue>,
}

impl DataContext {
    pub fn seeded(parameters: AHashMap<String, DataValue>) -> Self {
        Self { values: parameters }
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.values.get(key)
    }

    /// Writes a node output. Overwrites only happen when a later node
    /// explicitly redeclares the same output binding; that is allowed but
    /// logged.
    pub fn insert(&mut self, key: String, value: DataValue) {
        if self.values.contains_key(&key) {
            warn!(key = %key, "data context key redeclared by a later node");
        }
        self.values.insert(key, value);
    }
}

/// Outcome of one workflow execution: either all declared outputs, or the
/// first failure, in both cases with elapsed wall-clock time.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AHashMap<String, DataValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time: Duration,
}

impl ExecutionResult {
    fn succeeded(result: AHashMap<String, DataValue>, execution_time: Duration) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            execution_time,
        }
    }

    fn failed(error: String, execution_time: Duration) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
            execution_time,
        }
    }
}

/// Runs compiled workflows step by step, single-threaded within a run.
///
/// The compiled plan is read-only and may be shared across concurrent
/// invocations; each invocation owns its own context.
pub struct Executor;

impl Executor {
    /// Executes every step in compiled order, measuring elapsed time.
    ///
    /// The first operator failure, missing binding, or panic aborts the
    /// remaining pipeline and is returned as a structured failure; no
    /// partial outputs are exposed.
    pub fn execute_with_monitoring(
        workflow: &CompiledWorkflow,
        parameters: AHashMap<String, DataValue>,
    ) -> ExecutionResult {
        let started = Instant::now();
        let mut context = DataContext::seeded(parameters);

        for step in &workflow.steps {
            let mut inputs: OperatorInputs = step.literals.clone();
            for (name, key) in &step.inputs {
                match context.get(key) {
                    Some(value) => {
                        inputs.insert(name.clone(), value.clone());
                    }
                    None => {
                        return ExecutionResult::failed(
                            format!(
                                "node '{}': input '{}' is bound to '{}', which is missing from the data context",
                                step.node_id, name, key
                            ),
                            started.elapsed(),
                        );
                    }
                }
            }

            debug!(node = %step.node_id, operator = %step.operator.id(), "executing step");
            let outcome = catch_unwind(AssertUnwindSafe(|| step.operator.run(&inputs)));

            let result = match outcome {
                Ok(result) => result,
                Err(panic) => {
                    return ExecutionResult::failed(
                        format!(
                            "node '{}' panicked: {}",
                            step.node_id,
                            panic_message(&*panic)
                        ),
                        started.elapsed(),
                    );
                }
            };

            if !result.success {
                let message = result
                    .error
                    .unwrap_or_else(|| "operator reported failure without a message".to_string());
                return ExecutionResult::failed(
                    format!("node '{}' failed: {}", step.node_id, message),
                    started.elapsed(),
                );
            }

            let mut data = result.data.unwrap_or_default();
            for (name, key) in &step.outputs {
                match data.remove(name) {
                    Some(value) => context.insert(key.clone(), value),
                    None => {
                        return ExecutionResult::failed(
                            format!(
                                "node '{}' succeeded but did not produce declared output '{}'",
                                step.node_id, name
                            ),
                            started.elapsed(),
                        );
                    }
                }
            }
        }

        let mut outputs = AHashMap::new();
        for key in &workflow.outputs {
            match context.get(key) {
                Some(value) => {
                    outputs.insert(key.clone(), value.clone());
                }
                None => {
                    return ExecutionResult::failed(
                        format!("declared workflow output '{}' was never produced", key),
                        started.elapsed(),
                    );
                }
            }
        }

        ExecutionResult::succeeded(outputs, started.elapsed())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
