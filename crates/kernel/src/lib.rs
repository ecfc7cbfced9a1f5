//! Simulation kernel: the scene world, the frame clock, the sorted task
//! scheduler, and the actor-of-interest motion model.
//!
//! # Invariants
//! - Entities are never removed once spawned.
//! - Tasks run in ascending sort order; ties keep insertion order.
//! - Motion integration never clamps or resolves collisions.

pub mod actor;
pub mod clock;
pub mod scheduler;
pub mod world;

pub use actor::{ActorMotion, ActorSnapshot, DEFAULT_MOVE_SPEED, DEFAULT_TURN_SPEED};
pub use clock::SimClock;
pub use scheduler::{DueTask, Scheduler, TaskError};
pub use world::{EntityData, World, WorldError};
