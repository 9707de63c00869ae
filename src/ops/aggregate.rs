use super::{Operator, OperatorInputs, OperatorResult, require_input};
use crate::data::{DataValue, GroupReport, SeriesTable};
use itertools::Itertools;

/// Collapses each selected group's member columns into one aggregated
/// series: the per-index mean across members.
///
/// All member columns of a group must share one length; a mismatch is a
/// structured failure, not a truncation.
pub fn aggregate_groups(table: &SeriesTable, report: &GroupReport) -> Result<SeriesTable, String> {
    let mut aggregated = SeriesTable::new();

    for group_name in &report.selected {
        let members = report
            .mappings
            .get(group_name)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let columns: Vec<&[f64]> = members
            .iter()
            .filter_map(|m| table.get(m).map(Vec::as_slice))
            .collect();
        if columns.is_empty() {
            continue;
        }

        let lengths: Vec<usize> = columns.iter().map(|c| c.len()).unique().collect();
        let len = match lengths.as_slice() {
            [len] => *len,
            _ => {
                return Err(format!(
                    "group '{}' has member columns of differing lengths: {:?}",
                    group_name, lengths
                ));
            }
        };

        let mut series = Vec::with_capacity(len);
        for i in 0..len {
            let sum: f64 = columns.iter().map(|c| c[i]).sum();
            series.push(sum / columns.len() as f64);
        }
        aggregated.insert(group_name.clone(), series);
    }

    Ok(aggregated)
}

/// Workflow operator wrapping the aggregator.
///
/// Inputs: `data` (Table), `groups` (Groups). Output: `aggregated`
/// (Table keyed by group name).
pub struct GroupAggregator;

impl Operator for GroupAggregator {
    fn id(&self) -> &str {
        "group_aggregator"
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

        let report = match require_input(inputs, "groups") {
            Ok(DataValue::Groups(r)) => r,
            Ok(v) => {
                return OperatorResult::fail(format!(
                    "input 'groups' must be Groups, found {}",
                    v.type_name()
                ));
            }
            Err(e) => return OperatorResult::fail(e),
        };

        match aggregate_groups(table, report) {
            Ok(aggregated) => OperatorResult::output("aggregated", DataValue::Table(aggregated)),
            Err(message) => OperatorResult::fail(message),
        }
    }
}
