use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A named boolean/arithmetic rule authored in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    pub expression: String,
}

/// A named process stage identified by a detection expression.
///
/// Stage sets are ordered: detection evaluates stages in declared order
/// (after a stable sort on `priority` where present) and the first match
/// claims an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub id: String,
    pub name: String,
    pub expression: String,
    #[serde(default)]
    pub priority: Option<i32>,
}

/// A named sensor group and its declared member columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub data_type: Option<String>,
}

/// The rule, stage, and group catalog a workflow's nodes may reference by
/// id. Loaded once per process configuration, read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub stages: Vec<StageDefinition>,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
}

impl RuleSet {
    pub fn rule(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn stage(&self, id: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn group(&self, name: &str) -> Option<&GroupDefinition> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// All stages in detection order: stable sort on `priority`, so stages
    /// without one keep their declaration order.
    pub fn stages_in_order(&self) -> Vec<StageDefinition> {
        let mut stages = self.stages.clone();
        stages.sort_by_key(|s| s.priority.unwrap_or(i32::MAX));
        stages
    }
}

/// Defines a single operator node in a workflow.
///
/// `inputs` and `outputs` map the operator's own port names to data
/// context keys; `params` carries literal configuration, including `$rule`,
/// `$stages`, and `$groups` references resolved at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    pub operator: String,
    #[serde(default)]
    pub inputs: AHashMap<String, String>,
    #[serde(default)]
    pub outputs: AHashMap<String, String>,
    #[serde(default)]
    pub params: AHashMap<String, serde_json::Value>,
}

/// The complete, canonical definition of an analysis workflow, ready for
/// compilation. This is the target structure for any configuration format
/// the caller parses (YAML is the reference encoding).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    pub nodes: Vec<NodeDefinition>,
}
