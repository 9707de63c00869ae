use thiserror::Error;

/// Errors that can occur while parsing or evaluating a rule expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Unknown symbol '{0}': not a context variable or a whitelisted function")]
    UnknownSymbol(String),

    #[error(
        "Shape mismatch during operation '{operation}': left has {left_len} elements, right has {right_len}"
    )]
    ShapeMismatch {
        operation: &'static str,
        left_len: usize,
        right_len: usize,
    },

    #[error("Division by zero during operation '{0}'")]
    DivisionByZero(&'static str),

    #[error("Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'")]
    TypeMismatch {
        operation: String,
        expected: String,
        found: String,
    },
}

/// Errors that can occur during the workflow compilation phase.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Workflow contains a dependency cycle involving node '{0}'")]
    CyclicDependency(String),

    #[error(
        "Node '{node_id}' input '{input}' is bound to '{key}', which is neither a workflow input nor an earlier node's output"
    )]
    UnresolvedInput {
        node_id: String,
        input: String,
        key: String,
    },

    #[error("Node '{node_id}' has an unregistered operator id: '{operator}'")]
    UnknownOperator { node_id: String, operator: String },

    #[error("Node '{node_id}' references rule '{rule_id}', which is not in the rule set")]
    UnknownRule { node_id: String, rule_id: String },

    #[error("Node '{node_id}' references stage '{stage_id}', which is not in the rule set")]
    UnknownStage { node_id: String, stage_id: String },

    #[error("Node '{node_id}' references sensor group '{group_name}', which is not in the rule set")]
    UnknownGroup { node_id: String, group_name: String },

    #[error("Node '{node_id}' has an invalid literal for parameter '{param}': {message}")]
    InvalidParam {
        node_id: String,
        param: String,
        message: String,
    },

    #[error("Workflow output '{0}' is not produced by any node or workflow input")]
    UnresolvedOutput(String),

    #[error("Duplicate node id '{0}' in workflow definition")]
    DuplicateNode(String),
}
