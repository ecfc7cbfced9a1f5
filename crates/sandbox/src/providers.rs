//! Seams to the external collision and AI systems.

use simworld_common::EntityId;
use simworld_ecs::{AiCharacter, Collider, ComponentStore};
use simworld_kernel::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEventKind {
    Enter,
    Exit,
}

/// A `from` collider starting or stopping contact with an `into` node.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub kind: CollisionEventKind,
    /// Entity owning the moving collider.
    pub from: EntityId,
    /// Name of the moving collider, e.g. `ballEventCollisionNode`.
    pub collider: String,
    pub into: EntityId,
}

impl CollisionEvent {
    /// Event name in the `<collider>-enters` / `<collider>-exits` form.
    pub fn event_name(&self) -> String {
        match self.kind {
            CollisionEventKind::Enter => format!("{}-enters", self.collider),
            CollisionEventKind::Exit => format!("{}-exits", self.collider),
        }
    }
}

/// Collision detection backend. The sandbox registers colliders and runs
/// one traversal per frame; response (if any) is the backend's business.
pub trait CollisionProvider {
    fn add_collider(&mut self, owner: EntityId, collider: &Collider);

    /// Test registered colliders against the scene. Into-collide masks of
    /// scene nodes live in `components`.
    fn traverse(&mut self, world: &mut World, components: &ComponentStore) -> Vec<CollisionEvent>;
}

/// Steering backend for AI characters.
pub trait AiWorld {
    fn add_character(&mut self, entity: EntityId, character: &AiCharacter);

    fn update(&mut self, world: &mut World, dt: f32);
}

/// Accepts colliders and never reports contact.
#[derive(Debug, Default)]
pub struct NullCollision {
    colliders: usize,
}

impl NullCollision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders
    }
}

impl CollisionProvider for NullCollision {
    fn add_collider(&mut self, owner: EntityId, collider: &Collider) {
        self.colliders += 1;
        tracing::debug!(owner = %owner.short(), collider = %collider.name, "collider registered without a backend");
    }

    fn traverse(&mut self, _world: &mut World, _components: &ComponentStore) -> Vec<CollisionEvent> {
        Vec::new()
    }
}

/// Accepts characters and never steers them.
#[derive(Debug, Default)]
pub struct NullAi {
    characters: usize,
}

impl NullAi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn character_count(&self) -> usize {
        self.characters
    }
}

impl AiWorld for NullAi {
    fn add_character(&mut self, entity: EntityId, character: &AiCharacter) {
        self.characters += 1;
        tracing::debug!(entity = %entity.short(), mass = character.mass, "AI character registered without a backend");
    }

    fn update(&mut self, _world: &mut World, _dt: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use simworld_ecs::CollisionSphere;

    #[test]
    fn event_names_follow_collider() {
        let mut event = CollisionEvent {
            kind: CollisionEventKind::Enter,
            from: EntityId::new(),
            collider: "ballEventCollisionNode".into(),
            into: EntityId::new(),
        };
        assert_eq!(event.event_name(), "ballEventCollisionNode-enters");
        event.kind = CollisionEventKind::Exit;
        assert_eq!(event.event_name(), "ballEventCollisionNode-exits");
    }

    #[test]
    fn null_backends_count_registrations() {
        let sphere = CollisionSphere::new(Vec3::ZERO, 1.0).unwrap();
        let mut collision = NullCollision::new();
        collision.add_collider(EntityId::new(), &Collider::event("ball", sphere));
        assert_eq!(collision.collider_count(), 1);
        let mut world = World::new();
        assert!(collision.traverse(&mut world, &ComponentStore::new()).is_empty());

        let mut ai = NullAi::new();
        ai.add_character(EntityId::new(), &AiCharacter::default());
        ai.update(&mut world, 0.1);
        assert_eq!(ai.character_count(), 1);
    }
}
