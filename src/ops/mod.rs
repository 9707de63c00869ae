use crate::data::DataValue;
use ahash::AHashMap;
use std::sync::Arc;

pub mod aggregate;
pub mod condition;
pub mod groups;
pub mod intervals;
pub mod stages;

pub use aggregate::GroupAggregator;
pub use condition::RuleCondition;
pub use groups::SensorGrouper;
pub use intervals::IntervalFinder;
pub use stages::StageDetector;

/// Named inputs handed to an operator for one invocation.
pub type OperatorInputs = AHashMap<String, DataValue>;

/// Named outputs produced by an operator on success.
pub type OperatorOutputs = AHashMap<String, DataValue>;

/// Outcome of one operator invocation. Failure is a normal value here,
/// not an `Err`: the executor decides what a failed node means for the
/// run.
#[derive(Debug, Clone)]
pub struct OperatorResult {
    pub success: bool,
    pub data: Option<OperatorOutputs>,
    pub error: Option<String>,
}

impl OperatorResult {
    pub fn ok(data: OperatorOutputs) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Convenience constructor for the common single-output case.
    pub fn output(name: &str, value: DataValue) -> Self {
        let mut data = OperatorOutputs::new();
        data.insert(name.to_string(), value);
        Self::ok(data)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// The capability contract every workflow node implements.
///
/// Anything exposing `run` can be registered and wired into a workflow,
/// including the built-in detectors themselves.
pub trait Operator: Send + Sync {
    fn id(&self) -> &str;
    fn run(&self, inputs: &OperatorInputs) -> OperatorResult;
}

/// Maps operator ids to implementations. Populated at startup; the
/// workflow builder resolves node operator ids against it.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    operators: AHashMap<String, Arc<dyn Operator>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all built-in operators registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SensorGrouper));
        registry.register(Arc::new(GroupAggregator));
        registry.register(Arc::new(StageDetector::new()));
        registry.register(Arc::new(IntervalFinder::new()));
        registry.register(Arc::new(RuleCondition));
        registry
    }

    pub fn register(&mut self, operator: Arc<dyn Operator>) {
        self.operators.insert(operator.id().to_string(), operator);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Operator>> {
        self.operators.get(id).cloned()
    }
}

/// Fetches a required input or produces the standard failure message.
pub(crate) fn require_input<'a>(
    inputs: &'a OperatorInputs,
    name: &str,
) -> Result<&'a DataValue, String> {
    inputs
        .get(name)
        .ok_or_else(|| format!("required input '{}' was not provided", name))
}
