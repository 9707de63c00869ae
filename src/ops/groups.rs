use super::{Operator, OperatorInputs, OperatorResult, require_input};
use crate::data::{DataValue, GroupReport, SeriesTable};
use crate::workflow::GroupDefinition;
use ahash::AHashMap;

/// Partitions raw columns into declared sensor groups.
///
/// Each group keeps the subset of its declared member columns actually
/// present in the data, in declaration order. A group with no present
/// columns is still reported, but not selected.
pub fn map_groups(table: &SeriesTable, definitions: &[GroupDefinition]) -> GroupReport {
    let mut mappings = AHashMap::new();
    let mut selected = Vec::new();

    for def in definitions {
        let present: Vec<String> = def
            .columns
            .iter()
            .filter(|column| table.contains_key(*column))
            .cloned()
            .collect();
        if !present.is_empty() {
            selected.push(def.name.clone());
        }
        mappings.insert(def.name.clone(), present);
    }

    GroupReport {
        mappings,
        selected,
        total: definitions.len(),
    }
}

/// Workflow operator wrapping the mapper.
///
/// Inputs: `data` (Table), `groups` (GroupDefs, substituted at build
/// time). Output: `groups` (Groups).
pub struct SensorGrouper;

impl Operator for SensorGrouper {
    fn id(&self) -> &str {
        "sensor_grouper"
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

        let definitions = match require_input(inputs, "groups") {
            Ok(DataValue::GroupDefs(defs)) => defs,
            Ok(v) => {
                return OperatorResult::fail(format!(
                    "input 'groups' must be GroupDefs, found {}",
                    v.type_name()
                ));
            }
            Err(e) => return OperatorResult::fail(e),
        };

        let report = map_groups(table, definitions);
        OperatorResult::output("groups", DataValue::Groups(report))
    }
}
