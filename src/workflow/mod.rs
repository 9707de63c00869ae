pub mod builder;
pub mod definition;
pub mod executor;

pub use builder::*;
pub use definition::*;
pub use executor::*;
