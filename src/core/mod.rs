//! Match aggregate, clock, event log, and index helpers.

/// Match aggregate root and its snapshot form.
pub mod aggregate;
/// Timestamp-based period clock.
pub mod clock;
/// Core error type.
pub mod error;
/// Helper index aliases.
pub mod indices;
/// Ordered event log with undo/redo.
pub mod log;
