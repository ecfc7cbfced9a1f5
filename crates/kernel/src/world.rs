use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use simworld_common::{EntityId, Transform};

/// Errors from world operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("entity {0:?} not found")]
    EntityNotFound(EntityId),
}

/// A named scene node: local transform plus optional parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    pub name: String,
    /// Transform relative to `parent`, or to the world root when `None`.
    pub transform: Transform,
    pub parent: Option<EntityId>,
}

/// The scene: every named node the sandbox has created.
///
/// Uses BTreeMap for deterministic iteration order. Nodes live for the
/// lifetime of the world; there is no despawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    entities: BTreeMap<EntityId, EntityData>,
    tick: u64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames stepped so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &BTreeMap<EntityId, EntityData> {
        &self.entities
    }

    /// Spawn a root-level node.
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        self.insert(name.into(), transform, None)
    }

    /// Spawn a node whose transform is relative to `parent`.
    pub fn spawn_child(
        &mut self,
        name: impl Into<String>,
        parent: EntityId,
        transform: Transform,
    ) -> Result<EntityId, WorldError> {
        if !self.entities.contains_key(&parent) {
            return Err(WorldError::EntityNotFound(parent));
        }
        Ok(self.insert(name.into(), transform, Some(parent)))
    }

    fn insert(&mut self, name: String, transform: Transform, parent: Option<EntityId>) -> EntityId {
        let id = EntityId::new();
        tracing::debug!(id = %id.short(), name = %name, "node spawned");
        self.entities.insert(
            id,
            EntityData {
                name,
                transform,
                parent,
            },
        );
        id
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityData> {
        self.entities.get_mut(&id)
    }

    /// Replace an entity's local transform.
    pub fn set_transform(&mut self, id: EntityId, new: Transform) -> bool {
        match self.entities.get_mut(&id) {
            Some(data) => {
                data.transform = new;
                true
            }
            None => false,
        }
    }

    /// All entities carrying `name`, anywhere in the hierarchy.
    pub fn find(&self, name: &str) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, data)| data.name == name)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Transform of `id` expressed in world space.
    pub fn world_transform(&self, id: EntityId) -> Option<Transform> {
        let data = self.entities.get(&id)?;
        match data.parent {
            Some(parent) => Some(self.world_transform(parent)?.compose(&data.transform)),
            None => Some(data.transform),
        }
    }

    /// Advance the frame counter.
    pub fn step(&mut self) {
        self.tick += 1;
    }
}
