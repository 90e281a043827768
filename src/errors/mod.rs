//! Error types for the orchestration core.
//!
//! Every public operation converts lower-level failures into a [`CoreError`]
//! at its own boundary; raw store and downstream-service errors are logged
//! but never surfaced verbatim to callers.

mod core_error;

pub use core_error::{CoreError, CoreErrorKind};

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
