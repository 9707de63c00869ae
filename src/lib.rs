//! # Cureflow - Rule-Driven Process Analysis Engine
//!
//! **Cureflow** analyzes multi-sensor industrial process recordings (for
//! example composite-material curing cycles) by evaluating
//! configuration-defined rules against time-series data, segmenting the
//! timeline into named process stages, and producing structured results.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic: callers parse their own configuration
//! encoding (YAML is the reference) into the canonical definition
//! structures and hand raw columnar data to the executor. The primary
//! workflow is:
//!
//! 1.  **Load Your Configuration**: Parse workflow, rule, stage, and
//!     sensor-group definitions into [`workflow::WorkflowDefinition`] and
//!     [`workflow::RuleSet`].
//! 2.  **Compile**: Use [`workflow::WorkflowBuilder`] with an
//!     [`ops::OperatorRegistry`] to validate the graph, resolve rule
//!     references, and produce a reusable [`workflow::CompiledWorkflow`].
//! 3.  **Execute**: Run [`workflow::Executor::execute_with_monitoring`]
//!     once per recorded run, seeding the data context with the run's
//!     parameters.
//!
//! ## Quick Start
//!
//! ```rust
//! use cureflow::prelude::*;
//! use ahash::AHashMap;
//!
//! let rules = RuleSet {
//!     stages: vec![StageDefinition {
//!         id: "heating".to_string(),
//!         name: "Heating".to_string(),
//!         expression: "temp > 40 and rate(series) > 0".to_string(),
//!         priority: None,
//!     }],
//!     ..RuleSet::default()
//! };
//!
//! let definition = WorkflowDefinition {
//!     name: "cure-analysis".to_string(),
//!     inputs: vec!["recording".to_string()],
//!     outputs: vec!["stages".to_string()],
//!     nodes: vec![NodeDefinition {
//!         id: "detect".to_string(),
//!         operator: "stage_detector".to_string(),
//!         inputs: AHashMap::from([("data".to_string(), "recording".to_string())]),
//!         outputs: AHashMap::from([("stages".to_string(), "stages".to_string())]),
//!         params: AHashMap::from([(
//!             "stages".to_string(),
//!             serde_json::json!({"$stages": "all"}),
//!         )]),
//!     }],
//! };
//!
//! let registry = OperatorRegistry::with_defaults();
//! let compiled = WorkflowBuilder::build(&definition, &registry, &rules).unwrap();
//!
//! let mut parameters = AHashMap::new();
//! parameters.insert(
//!     "recording".to_string(),
//!     DataValue::Table(AHashMap::from([(
//!         "temp".to_string(),
//!         vec![26.0, 31.0, 36.0, 41.0, 46.0],
//!     )])),
//! );
//!
//! let result = Executor::execute_with_monitoring(&compiled, parameters);
//! assert!(result.success);
//! ```

pub mod data;
pub mod error;
pub mod expr;
pub mod ops;
pub mod prelude;
pub mod workflow;
