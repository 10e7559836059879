// ABOUTME: Tool module - defines tools, schemas, registry, and results.
// ABOUTME: Core abstraction for operations a directive can invoke.

mod registry;
mod result;
mod schema;
mod traits;

pub use registry::*;
pub use result::*;
pub use schema::*;
pub use traits::*;

#[cfg(test)]
mod registry_test;
