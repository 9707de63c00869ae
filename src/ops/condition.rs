use super::{Operator, OperatorInputs, OperatorResult, require_input};
use crate::data::DataValue;
use crate::expr::{EvalContext, Value, evaluate};

/// Evaluates a rule expression over a column table, columns bound as
/// series so comparisons broadcast elementwise.
///
/// Inputs: `data` (Table), `expression` (Text, usually substituted from a
/// `$rule` reference at build time). Output: `condition` (BoolSeries),
/// the canonical input of the interval finder.
pub struct RuleCondition;

impl Operator for RuleCondition {
    fn id(&self) -> &str {
        "rule_condition"
    }

    fn run(&self, inputs: &OperatorInputs) -> OperatorResult {
        let table = match require_input(inputs, "data") {
            Ok(v) => match v.as_table() {
                Some(t) => t,
                None => {
                    return OperatorResult::fail(format!(
                        "input 'data' must be a Table, found {}",
                        v.type_name()
                    ));
                }
            },
            Err(e) => return OperatorResult::fail(e),
        };

        let expression = match require_input(inputs, "expression") {
            Ok(v) => match v.as_text() {
                Some(text) => text,
                None => {
                    return OperatorResult::fail(format!(
                        "input 'expression' must be Text, found {}",
                        v.type_name()
                    ));
                }
            },
            Err(e) => return OperatorResult::fail(e),
        };

        let mut ctx = EvalContext::new();
        for (name, column) in table {
            ctx.set_series(name.clone(), column.clone());
        }

        match evaluate(expression, &ctx) {
            Ok(Value::BoolSeries(series)) => {
                OperatorResult::output("condition", DataValue::BoolSeries(series))
            }
            Ok(Value::Bool(b)) => {
                // A condition with no series reference collapses to one
                // scalar verdict covering the whole timeline.
                let len = table.values().map(Vec::len).max().unwrap_or(0);
                OperatorResult::output("condition", DataValue::BoolSeries(vec![b; len]))
            }
            Ok(other) => OperatorResult::fail(format!(
                "expression produced {}, expected a boolean condition",
                other.type_name()
            )),
            Err(e) => OperatorResult::fail(e.to_string()),
        }
    }
}
