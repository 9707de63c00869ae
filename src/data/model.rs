use crate::workflow::{GroupDefinition, StageDefinition};
use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

/// Columnar sensor data: one ordered numeric series per column name.
pub type SeriesTable = AHashMap<String, Vec<f64>>;

/// A single timed duration event, the normalized output of the interval
/// finder: `timestamp` is the run's start, `value` is its duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationEvent {
    pub timestamp: f64,
    pub value: f64,
}

/// The result of a stage detection pass over one timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageAssignment {
    /// Per-index stage id; `None` where no stage claimed the index.
    pub labels: Vec<Option<String>>,
    /// Ascending indices claimed by each declared stage. Every declared
    /// stage has an entry, empty or not; no index appears twice.
    pub stage_data: AHashMap<String, Vec<usize>>,
}

/// The result of mapping raw columns into declared sensor groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    /// Declared member columns actually present in the data, in
    /// declaration order. Groups with no present columns map to an empty
    /// list.
    pub mappings: AHashMap<String, Vec<String>>,
    /// Names of groups with at least one present column, in declaration
    /// order.
    pub selected: Vec<String>,
    /// Total number of declared groups.
    pub total: usize,
}

/// Values flowing through a workflow's data context.
///
/// One closed union covers everything a node may read or write; operator
/// dispatch over it is exhaustive, so an unexpected shape is a structured
/// failure rather than a silent coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Series(Vec<f64>),
    BoolSeries(Vec<bool>),
    Table(SeriesTable),
    Events(Vec<DurationEvent>),
    Stages(StageAssignment),
    Groups(GroupReport),
    StageDefs(Vec<StageDefinition>),
    GroupDefs(Vec<GroupDefinition>),
}

impl DataValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Number(_) => "Number",
            DataValue::Bool(_) => "Bool",
            DataValue::Text(_) => "Text",
            DataValue::Series(_) => "Series",
            DataValue::BoolSeries(_) => "BoolSeries",
            DataValue::Table(_) => "Table",
            DataValue::Events(_) => "Events",
            DataValue::Stages(_) => "Stages",
            DataValue::Groups(_) => "Groups",
            DataValue::StageDefs(_) => "StageDefs",
            DataValue::GroupDefs(_) => "GroupDefs",
        }
    }

    pub fn as_table(&self) -> Option<&SeriesTable> {
        match self {
            DataValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            DataValue::Series(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool_series(&self) -> Option<&[bool]> {
        match self {
            DataValue::BoolSeries(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Number(n) => write!(f, "{}", n),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Text(s) => write!(f, "{}", s),
            DataValue::Series(s) => write!(f, "Series[{}]", s.len()),
            DataValue::BoolSeries(s) => write!(f, "BoolSeries[{}]", s.len()),
            DataValue::Table(t) => write!(f, "Table[{} columns]", t.len()),
            DataValue::Events(e) => write!(f, "Events[{}]", e.len()),
            DataValue::Stages(s) => write!(f, "Stages[{} indices]", s.labels.len()),
            DataValue::Groups(g) => write!(f, "Groups[{}/{}]", g.selected.len(), g.total),
            DataValue::StageDefs(s) => write!(f, "StageDefs[{}]", s.len()),
            DataValue::GroupDefs(g) => write!(f, "GroupDefs[{}]", g.len()),
        }
    }
}
