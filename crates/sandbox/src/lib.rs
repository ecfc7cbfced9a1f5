//! The sandbox context: owns the world, stage, key map, scheduler, and
//! trace logger, and runs them one frame at a time.
//!
//! # Invariants
//! - Exactly one actor of interest receives input and is traced.
//! - Frame tasks run in sort order: input 0, control 10, AI 20,
//!   collision 30, actor state 50, trace 100.
//! - A failed hotkey action is logged and ignored; it never stops the loop.
//!
//! Collision detection and AI steering are external; the sandbox only
//! registers colliders and characters with a [`CollisionProvider`] and an
//! [`AiWorld`] and forwards their per-frame calls.

mod config;
mod error;
mod hooks;
mod providers;
mod sandbox;
pub mod scenario;
mod task;

pub use config::{ActorConfig, ConfigError, MotionKeys, SandboxConfig};
pub use error::SandboxError;
pub use hooks::{NoHooks, SimHooks};
pub use providers::{
    AiWorld, CollisionEvent, CollisionEventKind, CollisionProvider, NullAi, NullCollision,
};
pub use sandbox::{ActorSpec, NOTICE_SECONDS, Sandbox};
pub use task::SimTask;
