use simworld_assets::AssetError;
use simworld_common::EntityId;
use simworld_ecs::ComponentError;
use simworld_kernel::{TaskError, WorldError};
use simworld_render::StageError;
use simworld_tools::TraceError;

use crate::config::ConfigError;

/// Errors from sandbox operations.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Component(#[from] ComponentError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("entity {0:?} is not an actor")]
    UnknownActor(EntityId),
    #[error("actor '{0}' already exists")]
    DuplicateActor(String),
}
