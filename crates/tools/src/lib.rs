//! Developer tooling: the per-frame trace file.
//!
//! # Invariants
//! - At most one trace file is open at a time.
//! - Enabling while enabled and disabling while disabled are no-ops.

pub mod trace;

pub use trace::{TraceError, TraceLogger, format_line};
