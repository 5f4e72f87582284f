//! Public API surface of the runtime crate.
mod errors;

pub use errors::{AiError, Result};
