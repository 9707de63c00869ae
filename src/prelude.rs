//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the cureflow crate so
//! callers can bring the core API into scope with a single import.

// Expression evaluation
pub use crate::expr::{CachingEvaluator, EvalContext, Expr, Value, evaluate, rate};

// Data model
pub use crate::data::{
    DataValue, DurationEvent, GroupReport, SeriesTable, StageAssignment,
};

// Operators
pub use crate::ops::{
    GroupAggregator, IntervalFinder, Operator, OperatorInputs, OperatorOutputs, OperatorRegistry,
    OperatorResult, RuleCondition, SensorGrouper, StageDetector,
};
pub use crate::ops::intervals::{
    DEFAULT_STEP, Interval, duration_events, duration_events_sliced, find_intervals,
};
pub use crate::ops::groups::map_groups;
pub use crate::ops::stages::SeriesScope;

// Workflow compilation and execution
pub use crate::workflow::{
    CompiledStep, CompiledWorkflow, DataContext, ExecutionResult, Executor, GroupDefinition,
    NodeDefinition, RuleDefinition, RuleSet, StageDefinition, WorkflowBuilder, WorkflowDefinition,
};

// Error types
pub use crate::error::{BuildError, EvalError};
