mod classify;
mod collaborators;
mod error;
mod parser;
mod runner;
mod source;
mod types;

pub use classify::*;
pub use collaborators::*;
pub use error::*;
pub use parser::*;
pub use runner::*;
pub use source::*;
pub use types::*;

#[cfg(test)]
mod script_tests;
