//! Component storage for sandbox entities.
//!
//! Models, colliders, collide masks and AI characters each get a map keyed
//! by the owning node, so walking any of them visits nodes in id order.
//!
//! Components are only added or updated, never removed, matching the
//! world's no-deletion lifecycle.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use simworld_common::EntityId;

/// A handle referencing a loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelHandle(pub u64);

/// Bit set deciding which colliders can hit which nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollideMask(pub u32);

impl CollideMask {
    pub const ALL_OFF: Self = Self(0);
    /// Solid geometry that pushes physics colliders back.
    pub const SOLID: Self = Self::bit(0);
    /// Goal regions that raise enter/exit events.
    pub const GOAL: Self = Self::bit(1);

    pub const fn bit(n: u32) -> Self {
        Self(1 << n)
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Replace the bits selected by `bits_to_change` with those in `value`.
    pub fn with_bits(self, value: Self, bits_to_change: Self) -> Self {
        Self((self.0 & !bits_to_change.0) | (value.0 & bits_to_change.0))
    }
}

/// Errors from component construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    #[error("collision sphere radius must be non-negative, got {0}")]
    NegativeRadius(f32),
}

/// Sphere collision volume, relative to its owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl CollisionSphere {
    pub fn new(center: Vec3, radius: f32) -> Result<Self, ComponentError> {
        if radius < 0.0 || radius.is_nan() {
            return Err(ComponentError::NegativeRadius(radius));
        }
        Ok(Self { center, radius })
    }
}

/// What a collider is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderRole {
    /// Feeds the physics provider's collision response.
    Physics,
    /// Raises enter/exit events to user hooks.
    Event,
}

/// A collision solid attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Node name, used as the prefix of collision event names.
    pub name: String,
    pub role: ColliderRole,
    pub sphere: CollisionSphere,
    pub from_mask: CollideMask,
    pub into_mask: CollideMask,
}

impl Collider {
    /// Physics collider: hits solid geometry, can't be hit.
    pub fn physics(owner: &str, sphere: CollisionSphere) -> Self {
        Self {
            name: format!("{owner}PhysicsCollisionNode"),
            role: ColliderRole::Physics,
            sphere,
            from_mask: CollideMask::SOLID,
            into_mask: CollideMask::ALL_OFF,
        }
    }

    /// Event collider: hits goal regions, can't be hit.
    pub fn event(owner: &str, sphere: CollisionSphere) -> Self {
        Self {
            name: format!("{owner}EventCollisionNode"),
            role: ColliderRole::Event,
            sphere,
            from_mask: CollideMask::GOAL,
            into_mask: CollideMask::ALL_OFF,
        }
    }
}

/// Steering parameters handed to the AI provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiCharacter {
    pub mass: f32,
    pub movement_force: f32,
    pub max_force: f32,
}

impl Default for AiCharacter {
    fn default() -> Self {
        Self {
            mass: 50.0,
            movement_force: 10.0,
            max_force: 30.0,
        }
    }
}

/// Per-node components for the sandbox scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentStore {
    models: BTreeMap<EntityId, ModelHandle>,
    colliders: BTreeMap<EntityId, Vec<Collider>>,
    into_masks: BTreeMap<EntityId, CollideMask>,
    ai_characters: BTreeMap<EntityId, AiCharacter>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Model ---
    pub fn set_model(&mut self, entity: EntityId, model: ModelHandle) {
        self.models.insert(entity, model);
    }

    pub fn get_model(&self, entity: EntityId) -> Option<ModelHandle> {
        self.models.get(&entity).copied()
    }

    pub fn models(&self) -> &BTreeMap<EntityId, ModelHandle> {
        &self.models
    }

    // --- Collider ---
    pub fn add_collider(&mut self, entity: EntityId, collider: Collider) {
        self.colliders.entry(entity).or_default().push(collider);
    }

    pub fn colliders(&self, entity: EntityId) -> &[Collider] {
        self.colliders.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every (entity, collider) pair, in entity order.
    pub fn all_colliders(&self) -> impl Iterator<Item = (EntityId, &Collider)> {
        self.colliders
            .iter()
            .flat_map(|(id, list)| list.iter().map(move |c| (*id, c)))
    }

    // --- Into-collide mask on scene geometry ---
    /// Set or clear `bits` in an entity's into-collide mask.
    pub fn set_into_bits(&mut self, entity: EntityId, bits: CollideMask, on: bool) {
        let old = self.object_mask(entity);
        let value = if on { bits } else { CollideMask::ALL_OFF };
        let new = old.with_bits(value, bits);
        if old != new {
            tracing::debug!(entity = %entity.short(), old = old.0, new = new.0, "collide mask changed");
        }
        self.into_masks.insert(entity, new);
    }

    pub fn object_mask(&self, entity: EntityId) -> CollideMask {
        self.into_masks.get(&entity).copied().unwrap_or_default()
    }

    // --- AI character ---
    pub fn set_ai_character(&mut self, entity: EntityId, character: AiCharacter) {
        self.ai_characters.insert(entity, character);
    }

    pub fn get_ai_character(&self, entity: EntityId) -> Option<&AiCharacter> {
        self.ai_characters.get(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_bits() {
        assert_eq!(CollideMask::SOLID, CollideMask(0b01));
        assert_eq!(CollideMask::GOAL, CollideMask(0b10));
        let both = CollideMask(0b11);
        assert!(both.contains(CollideMask::GOAL));
        assert!(!CollideMask::SOLID.intersects(CollideMask::GOAL));
    }

    #[test]
    fn with_bits_only_touches_selected_bits() {
        let m = CollideMask(0b1010);
        assert_eq!(m.with_bits(CollideMask(0b0001), CollideMask(0b0011)), CollideMask(0b1001));
    }

    #[test]
    fn sphere_rejects_negative_radius() {
        assert!(CollisionSphere::new(Vec3::ZERO, 0.0).is_ok());
        assert_eq!(
            CollisionSphere::new(Vec3::ZERO, -1.0),
            Err(ComponentError::NegativeRadius(-1.0))
        );
    }

    #[test]
    fn actor_colliders_use_distinct_masks() {
        let sphere = CollisionSphere::new(Vec3::ZERO, 1.0).unwrap();
        let physics = Collider::physics("ball", sphere);
        let event = Collider::event("ball", sphere);
        assert_eq!(physics.name, "ballPhysicsCollisionNode");
        assert_eq!(event.name, "ballEventCollisionNode");
        assert_eq!(physics.from_mask, CollideMask::SOLID);
        assert_eq!(event.from_mask, CollideMask::GOAL);
        assert_eq!(event.into_mask, CollideMask::ALL_OFF);
    }

    #[test]
    fn colliders_accumulate_per_entity() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        let sphere = CollisionSphere::new(Vec3::ZERO, 0.5).unwrap();
        store.add_collider(id, Collider::physics("a", sphere));
        store.add_collider(id, Collider::event("a", sphere));
        assert_eq!(store.colliders(id).len(), 2);
        assert_eq!(store.all_colliders().count(), 2);
        assert!(store.colliders(EntityId::new()).is_empty());
    }

    #[test]
    fn solid_and_goal_flags_are_independent() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        store.set_into_bits(id, CollideMask::SOLID, true);
        store.set_into_bits(id, CollideMask::GOAL, true);
        assert_eq!(store.object_mask(id), CollideMask(0b11));
        store.set_into_bits(id, CollideMask::SOLID, false);
        assert_eq!(store.object_mask(id), CollideMask::GOAL);
    }

    #[test]
    fn untouched_entity_has_empty_mask() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        assert_eq!(store.object_mask(id), CollideMask::ALL_OFF);
        store.set_into_bits(id, CollideMask::SOLID, false);
        assert_eq!(store.object_mask(id), CollideMask::ALL_OFF);
    }

    #[test]
    fn ai_character_defaults() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        store.set_ai_character(id, AiCharacter::default());
        let c = store.get_ai_character(id).unwrap();
        assert_eq!((c.mass, c.movement_force, c.max_force), (50.0, 10.0, 30.0));
    }

    #[test]
    fn model_handles_are_kept_per_entity() {
        let mut store = ComponentStore::new();
        let id = EntityId::new();
        store.set_model(id, ModelHandle(7));
        assert_eq!(store.get_model(id), Some(ModelHandle(7)));
        assert_eq!(store.models().len(), 1);
        assert_eq!(store.get_model(EntityId::new()), None);
    }
}
