use ahash::AHashMap;
use std::fmt;

/// Runtime value types produced by expression evaluation.
///
/// Operators broadcast between scalars and series: a scalar paired with a
/// series applies the operation elementwise and yields a series of the same
/// length.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Bool(bool),
    Series(Vec<f64>),
    BoolSeries(Vec<bool>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "Scalar",
            Value::Bool(_) => "Bool",
            Value::Series(_) => "Series",
            Value::BoolSeries(_) => "BoolSeries",
        }
    }

    /// Returns the scalar boolean outcome, if this value is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
            if n.fract() == 0.0 {
                write!(f, "{}", n as i64)
            } else {
                write!(f, "{}", n)
            }
        }
        match self {
            Value::Scalar(n) => number(f, *n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Series(s) => {
                write!(f, "[")?;
                for (i, n) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    number(f, *n)?;
                }
                write!(f, "]")
            }
            Value::BoolSeries(s) => {
                write!(f, "[")?;
                for (i, b) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", b)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Per-call variable bindings for one expression evaluation.
///
/// Keys are unique per evaluation call; the context has no identity beyond
/// the call that owns it.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    vars: AHashMap<String, Value>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn set_scalar(&mut self, name: impl Into<String>, value: f64) {
        self.set(name, Value::Scalar(value));
    }

    pub fn set_series(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.set(name, Value::Series(values));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}
