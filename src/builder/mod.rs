//! Construction API: the fluent machine builder, build errors, and
//! scaffolding macros.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;
