pub mod eval;
pub mod parser;
pub(crate) mod token;
pub mod value;

pub use eval::*;
pub use parser::*;
pub use value::*;
