pub mod connection;
pub mod executor;
pub mod statement;

pub use connection::*;
pub use executor::*;
pub use statement::*;
