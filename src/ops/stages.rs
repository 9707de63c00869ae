use super::{Operator, OperatorInputs, OperatorResult, require_input};
use crate::data::{DataValue, SeriesTable, StageAssignment};
use crate::error::EvalError;
use crate::expr::{EvalContext, Expr, Value, eval_expr};
use crate::workflow::StageDefinition;
use ahash::AHashMap;

/// How much history the `series` variables carry at each timeline index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesScope {
    /// The series up to and including the current index.
    #[default]
    Prefix,
    /// The whole series at every index.
    Full,
}

/// Classifies each timeline index against per-stage detection
/// expressions.
///
/// Stages are evaluated in the order given; the first whose expression is
/// true at an index claims it. Unclaimed indices stay unassigned.
#[derive(Debug, Default)]
pub struct StageDetector {
    scope: SeriesScope,
}

impl StageDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: SeriesScope) -> Self {
        Self { scope }
    }

    /// Runs detection over aggregated per-group series.
    ///
    /// The per-index context binds each column name to its scalar value,
    /// `<name>_series` to that column's series (scoped per
    /// [`SeriesScope`]), and `series` to the primary column's series. The
    /// primary column is `primary` when given, otherwise the table's only
    /// column; with several columns and no explicit primary, `series` is
    /// not bound.
    pub fn detect(
        &self,
        table: &SeriesTable,
        primary: Option<&str>,
        stages: &[StageDefinition],
    ) -> Result<StageAssignment, EvalError> {
        let parsed: Vec<(&StageDefinition, Expr)> = stages
            .iter()
            .map(|stage| Expr::parse(&stage.expression).map(|expr| (stage, expr)))
            .collect::<Result<_, _>>()?;

        let len = table.values().map(Vec::len).max().unwrap_or(0);
        let primary = primary.or_else(|| {
            if table.len() == 1 {
                table.keys().next().map(String::as_str)
            } else {
                None
            }
        });

        let mut labels: Vec<Option<String>> = Vec::with_capacity(len);
        let mut stage_data: AHashMap<String, Vec<usize>> = stages
            .iter()
            .map(|stage| (stage.id.clone(), Vec::new()))
            .collect();

        for i in 0..len {
            let ctx = self.context_at(table, primary, i);
            let mut label = None;
            for (stage, expr) in &parsed {
                match eval_expr(expr, &ctx)? {
                    Value::Bool(true) => {
                        label = Some(stage.id.clone());
                        if let Some(claimed) = stage_data.get_mut(&stage.id) {
                            claimed.push(i);
                        }
                        break;
                    }
                    Value::Bool(false) => {}
                    other => {
                        return Err(EvalError::TypeMismatch {
                            operation: format!("stage '{}' detection", stage.id),
                            expected: "Bool".to_string(),
                            found: other.to_string(),
                        });
                    }
                }
            }
            labels.push(label);
        }

        Ok(StageAssignment { labels, stage_data })
    }

    fn context_at(&self, table: &SeriesTable, primary: Option<&str>, i: usize) -> EvalContext {
        let mut ctx = EvalContext::new();
        for (name, column) in table {
            if let Some(value) = column.get(i) {
                ctx.set_scalar(name.clone(), *value);
            }
            let scoped = match self.scope {
                SeriesScope::Prefix => &column[..column.len().min(i + 1)],
                SeriesScope::Full => &column[..],
            };
            ctx.set_series(format!("{}_series", name), scoped.to_vec());
            if primary == Some(name.as_str()) {
                ctx.set_series("series", scoped.to_vec());
            }
        }
        ctx
    }
}

impl Operator for StageDetector {
    fn id(&self) -> &str {
        "stage_detector"
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

        let stages = match require_input(inputs, "stages") {
            Ok(DataValue::StageDefs(defs)) => defs,
            Ok(v) => {
                return OperatorResult::fail(format!(
                    "input 'stages' must be StageDefs, found {}",
                    v.type_name()
                ));
            }
            Err(e) => return OperatorResult::fail(e),
        };

        let primary = match inputs.get("primary") {
            Some(v) => match v.as_text() {
                Some(name) => Some(name),
                None => {
                    return OperatorResult::fail(format!(
                        "input 'primary' must be Text, found {}",
                        v.type_name()
                    ));
                }
            },
            None => None,
        };

        match self.detect(table, primary, stages) {
            Ok(assignment) => OperatorResult::output("stages", DataValue::Stages(assignment)),
            Err(e) => OperatorResult::fail(e.to_string()),
        }
    }
}
