use super::definition::{NodeDefinition, RuleSet, WorkflowDefinition};
use crate::data::DataValue;
use crate::error::BuildError;
use crate::ops::{Operator, OperatorRegistry};
use ahash::AHashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// One node of a compiled workflow: the resolved operator, its bindings,
/// and the literal inputs substituted at build time.
pub struct CompiledStep {
    pub node_id: String,
    pub operator: Arc<dyn Operator>,
    /// `(operator input name, data context key)` pairs.
    pub inputs: Vec<(String, String)>,
    /// `(operator output name, data context key)` pairs.
    pub outputs: Vec<(String, String)>,
    /// Build-time constants merged into the operator's inputs on every
    /// run, e.g. rule expression text or resolved stage definitions.
    pub literals: AHashMap<String, DataValue>,
}

impl std::fmt::Debug for CompiledStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledStep")
            .field("node_id", &self.node_id)
            .field("operator", &self.operator.id())
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("literals", &self.literals)
            .finish()
    }
}

/// An ordered, immutable execution plan. Built once, reusable across
/// unlimited executions, safely shared read-only between threads.
#[derive(Debug)]
pub struct CompiledWorkflow {
    pub name: String,
    pub steps: Vec<CompiledStep>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// Validates and compiles a workflow definition into an executable plan.
pub struct WorkflowBuilder;

impl WorkflowBuilder {
    /// Compilation is all-or-nothing: any unresolved reference, cycle, or
    /// invalid parameter fails the build before any data is processed.
    pub fn build(
        definition: &WorkflowDefinition,
        registry: &OperatorRegistry,
        rules: &RuleSet,
    ) -> Result<CompiledWorkflow, BuildError> {
        let mut seen = HashSet::new();
        for node in &definition.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(BuildError::DuplicateNode(node.id.clone()));
            }
        }

        let ordered = Self::topological_order(definition)?;

        let mut steps = Vec::with_capacity(ordered.len());
        for node in ordered {
            let operator =
                registry
                    .get(&node.operator)
                    .ok_or_else(|| BuildError::UnknownOperator {
                        node_id: node.id.clone(),
                        operator: node.operator.clone(),
                    })?;
            let literals = Self::resolve_params(node, rules)?;

            let mut inputs: Vec<(String, String)> = node
                .inputs
                .iter()
                .map(|(name, key)| (name.clone(), key.clone()))
                .collect();
            inputs.sort();
            let mut outputs: Vec<(String, String)> = node
                .outputs
                .iter()
                .map(|(name, key)| (name.clone(), key.clone()))
                .collect();
            outputs.sort();

            debug!(node = %node.id, operator = %node.operator, "scheduled workflow step");
            steps.push(CompiledStep {
                node_id: node.id.clone(),
                operator,
                inputs,
                outputs,
                literals,
            });
        }

        info!(
            workflow = %definition.name,
            steps = steps.len(),
            "compiled workflow"
        );

        Ok(CompiledWorkflow {
            name: definition.name.clone(),
            steps,
            inputs: definition.inputs.clone(),
            outputs: definition.outputs.clone(),
        })
    }

    /// Linearizes nodes so every input binding is produced before its
    /// consumer runs. Deterministic: ready nodes are taken in declaration
    /// order, so the same definition always compiles to the same order.
    fn topological_order(
        definition: &WorkflowDefinition,
    ) -> Result<Vec<&NodeDefinition>, BuildError> {
        let mut available: HashSet<&str> =
            definition.inputs.iter().map(String::as_str).collect();
        let mut remaining: Vec<&NodeDefinition> = definition.nodes.iter().collect();
        let mut ordered = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready = remaining.iter().position(|node| {
                node.inputs
                    .values()
                    .all(|key| available.contains(key.as_str()))
            });
            match ready {
                Some(index) => {
                    let node = remaining.remove(index);
                    for key in node.outputs.values() {
                        available.insert(key.as_str());
                    }
                    ordered.push(node);
                }
                None => return Err(Self::diagnose_stall(&remaining, &available)),
            }
        }

        // Declared workflow outputs must be produced by some node or
        // passed through from the workflow inputs.
        for output in &definition.outputs {
            if !available.contains(output.as_str()) {
                return Err(BuildError::UnresolvedOutput(output.clone()));
            }
        }

        Ok(ordered)
    }

    /// Distinguishes a cycle from a plainly missing input: a stalled
    /// node whose missing key is produced by another stalled node is part
    /// of a cycle; otherwise the binding is unresolvable.
    fn diagnose_stall(remaining: &[&NodeDefinition], available: &HashSet<&str>) -> BuildError {
        let pending_outputs: HashSet<&str> = remaining
            .iter()
            .flat_map(|node| node.outputs.values().map(String::as_str))
            .collect();

        for node in remaining {
            let mut unsatisfied: Vec<(&String, &String)> = node
                .inputs
                .iter()
                .filter(|(_, key)| !available.contains(key.as_str()))
                .collect();
            unsatisfied.sort();
            if let Some((input, key)) = unsatisfied.first() {
                if pending_outputs.contains(key.as_str()) {
                    return BuildError::CyclicDependency(node.id.clone());
                }
                return BuildError::UnresolvedInput {
                    node_id: node.id.clone(),
                    input: (*input).clone(),
                    key: (*key).clone(),
                };
            }
        }
        // Unreachable: a stall implies at least one unsatisfied input.
        BuildError::CyclicDependency(remaining[0].id.clone())
    }

    /// Substitutes `$rule`, `$stages`, and `$groups` references with their
    /// configured content and converts plain JSON literals to data values.
    fn resolve_params(
        node: &NodeDefinition,
        rules: &RuleSet,
    ) -> Result<AHashMap<String, DataValue>, BuildError> {
        let mut literals = AHashMap::new();
        for (param, value) in &node.params {
            let resolved = Self::resolve_param(node, param, value, rules)?;
            literals.insert(param.clone(), resolved);
        }
        Ok(literals)
    }

    fn resolve_param(
        node: &NodeDefinition,
        param: &str,
        value: &serde_json::Value,
        rules: &RuleSet,
    ) -> Result<DataValue, BuildError> {
        if let Some(object) = value.as_object() {
            if let Some(rule_id) = object.get("$rule").and_then(|v| v.as_str()) {
                let rule = rules.rule(rule_id).ok_or_else(|| BuildError::UnknownRule {
                    node_id: node.id.clone(),
                    rule_id: rule_id.to_string(),
                })?;
                return Ok(DataValue::Text(rule.expression.clone()));
            }
            if let Some(selector) = object.get("$stages") {
                return Self::resolve_stage_selector(node, selector, rules);
            }
            if let Some(selector) = object.get("$groups") {
                return Self::resolve_group_selector(node, selector, rules);
            }
        }

        match value {
            serde_json::Value::Number(n) => Ok(DataValue::Number(n.as_f64().unwrap_or(0.0))),
            serde_json::Value::Bool(b) => Ok(DataValue::Bool(*b)),
            serde_json::Value::String(s) => Ok(DataValue::Text(s.clone())),
            serde_json::Value::Array(items) => {
                let numbers: Option<Vec<f64>> = items.iter().map(|v| v.as_f64()).collect();
                match numbers {
                    Some(series) => Ok(DataValue::Series(series)),
                    None => Err(Self::invalid_param(node, param, "array must be numeric")),
                }
            }
            _ => Err(Self::invalid_param(
                node,
                param,
                "unsupported literal shape",
            )),
        }
    }

    fn resolve_stage_selector(
        node: &NodeDefinition,
        selector: &serde_json::Value,
        rules: &RuleSet,
    ) -> Result<DataValue, BuildError> {
        match selector {
            serde_json::Value::String(s) if s == "all" => {
                Ok(DataValue::StageDefs(rules.stages_in_order()))
            }
            serde_json::Value::Array(ids) => {
                let mut stages = Vec::with_capacity(ids.len());
                for id in ids {
                    let id = id.as_str().ok_or_else(|| {
                        Self::invalid_param(node, "$stages", "stage ids must be strings")
                    })?;
                    let stage = rules.stage(id).ok_or_else(|| BuildError::UnknownStage {
                        node_id: node.id.clone(),
                        stage_id: id.to_string(),
                    })?;
                    stages.push(stage.clone());
                }
                Ok(DataValue::StageDefs(stages))
            }
            _ => Err(Self::invalid_param(
                node,
                "$stages",
                "expected \"all\" or a list of stage ids",
            )),
        }
    }

    fn resolve_group_selector(
        node: &NodeDefinition,
        selector: &serde_json::Value,
        rules: &RuleSet,
    ) -> Result<DataValue, BuildError> {
        match selector {
            serde_json::Value::String(s) if s == "all" => {
                Ok(DataValue::GroupDefs(rules.groups.clone()))
            }
            serde_json::Value::Array(names) => {
                let mut groups = Vec::with_capacity(names.len());
                for name in names {
                    let name = name.as_str().ok_or_else(|| {
                        Self::invalid_param(node, "$groups", "group names must be strings")
                    })?;
                    let group = rules.group(name).ok_or_else(|| BuildError::UnknownGroup {
                        node_id: node.id.clone(),
                        group_name: name.to_string(),
                    })?;
                    groups.push(group.clone());
                }
                Ok(DataValue::GroupDefs(groups))
            }
            _ => Err(Self::invalid_param(
                node,
                "$groups",
                "expected \"all\" or a list of group names",
            )),
        }
    }

    fn invalid_param(node: &NodeDefinition, param: &str, message: &str) -> BuildError {
        BuildError::InvalidParam {
            node_id: node.id.clone(),
            param: param.to_string(),
            message: message.to_string(),
        }
    }
}
