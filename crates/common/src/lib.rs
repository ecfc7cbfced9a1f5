//! Shared types for the simworld sandbox: entity ids, transforms, and
//! tri-state input axes.

pub mod types;

pub use types::{Axis, EntityId, InvalidAxis, Transform};
