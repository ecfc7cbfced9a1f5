//! The MouseWorld scenario: a ball driven around a maze model under an
//! ambient light, watched by a camera that rides along with it.

use glam::Vec3;
use simworld_common::EntityId;
use simworld_ecs::CollisionSphere;
use simworld_input::Key;
use simworld_kernel::ActorSnapshot;
use simworld_render::{Lens, LightKind};
use std::path::Path;

use crate::error::SandboxError;
use crate::hooks::SimHooks;
use crate::sandbox::{ActorSpec, Sandbox};

pub const WORLD_MODEL: &str = "world";
pub const ACTOR_MODEL: &str = "ball";
pub const MOVE_SPEED: f32 = 70.0;
pub const TURN_SPEED: f32 = 100.0;
/// Chase camera placement relative to the actor: behind, above, and
/// pitched down toward it.
pub const CHASE_OFFSET: Vec3 = Vec3::new(0.0, -30.0, 10.0);
pub const CHASE_HPR: Vec3 = Vec3::new(0.0, -15.0, 0.0);

/// Build the scene on `sandbox` and return the actor. Speeds set in the
/// config win over the scenario's own. Tracing starts when `trace` is given.
pub fn mouse_world(sandbox: &mut Sandbox, trace: Option<&Path>) -> Result<EntityId, SandboxError> {
    sandbox.setup_scene(WORLD_MODEL, Vec3::ZERO, Vec3::ZERO, Vec3::ONE)?;
    let actor = sandbox.add_actor(
        ACTOR_MODEL,
        ActorSpec {
            position: Vec3::new(0.0, 0.0, 10.0),
            collision_sphere: Some(CollisionSphere::new(Vec3::ZERO, 0.0)?),
            ..ActorSpec::default()
        },
    )?;
    sandbox.add_light("ambient", Key::char('l'), LightKind::Ambient, [1.0; 4])?;

    let speeds = sandbox.config().actor;
    sandbox.set_actor_speeds(
        speeds.move_speed.unwrap_or(MOVE_SPEED),
        speeds.turn_speed.unwrap_or(TURN_SPEED),
    );

    sandbox.add_camera(
        "camera",
        Key::char('c'),
        Some(actor),
        Lens::default(),
        CHASE_OFFSET,
        CHASE_HPR,
    )?;
    sandbox.activate_camera("camera")?;
    sandbox.activate_actor_control(true);

    if let Some(path) = trace {
        sandbox.set_tracing(path, true)?;
    }
    Ok(actor)
}

/// Traces the actor's position, heading, and speed each frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActorTraceHooks;

impl SimHooks for ActorTraceHooks {
    fn trace_update(&mut self, snapshot: &ActorSnapshot, message: &mut String) {
        *message = format!(
            "x:{:.4},y:{:.4},z:{:.4},h:{:.4},speed:{:.4}",
            unsigned_zero(snapshot.position.x),
            unsigned_zero(snapshot.position.y),
            unsigned_zero(snapshot.position.z),
            unsigned_zero(snapshot.heading),
            snapshot.speed()
        );
    }
}

/// Folds `-0.0` into `0.0` so idle values print without a sign.
fn unsigned_zero(v: f32) -> f32 {
    v + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;

    fn models_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("world.egg"), b"world").unwrap();
        std::fs::write(dir.path().join("ball.egg"), b"ball").unwrap();
        dir
    }

    #[test]
    fn builds_scene_with_chase_camera() {
        let dir = models_dir();
        let mut sb = Sandbox::new(SandboxConfig {
            models_dir: dir.path().to_path_buf(),
            ..SandboxConfig::default()
        })
        .unwrap();
        let actor = mouse_world(&mut sb, None).unwrap();

        let motion = sb.actor_motion().unwrap();
        assert_eq!((motion.move_speed, motion.turn_speed), (MOVE_SPEED, TURN_SPEED));
        assert!(sb.stage().camera("camera").unwrap().active);
        assert_eq!(
            sb.stage().region("default").unwrap().camera.as_deref(),
            Some("camera")
        );
        let cam_node = sb.stage().camera("camera").unwrap().node;
        assert_eq!(sb.world().get(cam_node).unwrap().parent, Some(actor));
        assert_eq!(sb.get_object("camera"), vec![cam_node]);
        assert!(!sb.stage().light("ambient").unwrap().on);
        assert_eq!(
            sb.task_names(),
            vec![
                "inputDispatch",
                "destroyMessage",
                "actorControl",
                "collisionTraverse",
                "actorStateUpdate"
            ]
        );
        assert!(!sb.is_tracing());
    }

    #[test]
    fn config_speeds_win() {
        let dir = models_dir();
        let mut config = SandboxConfig {
            models_dir: dir.path().to_path_buf(),
            ..SandboxConfig::default()
        };
        config.actor.move_speed = Some(5.0);
        let mut sb = Sandbox::new(config).unwrap();
        mouse_world(&mut sb, None).unwrap();
        let motion = sb.actor_motion().unwrap();
        assert_eq!((motion.move_speed, motion.turn_speed), (5.0, TURN_SPEED));
    }

    #[test]
    fn missing_world_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sb = Sandbox::new(SandboxConfig {
            models_dir: dir.path().to_path_buf(),
            ..SandboxConfig::default()
        })
        .unwrap();
        assert!(matches!(
            mouse_world(&mut sb, None),
            Err(SandboxError::Asset(_))
        ));
    }
}
