//! Single-writer async session and change stream APIs.

/// Event stream types emitted by the session.
pub mod events;
/// Handle and command loop implementation.
pub mod handle;
