//! sqlbench Core - shared types and boundary traits for the session engine
//!
//! This crate provides the pieces every other sqlbench crate depends on:
//!
//! - `BenchError` - error type for boundary failures
//! - `DatabaseBackend` - the external command boundary (execution, metadata, row writes)
//! - `Driver` - dialect-aware identifier quoting
//! - Result and metadata types like `QueryResult`, `TableColumn`, `TableSchema`

mod dialect;
mod driver;
mod error;
mod schema;
mod types;

pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
