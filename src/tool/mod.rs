// ABOUTME: Tool module - defines tools, the registry, and the executor.
// ABOUTME: Core abstraction for capabilities the upstream model can invoke.

mod executor;
mod registry;
mod result;
mod traits;

pub use executor::*;
pub use registry::*;
pub use result::*;
pub use traits::*;
