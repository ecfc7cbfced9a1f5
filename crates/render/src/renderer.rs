use crate::stage::Stage;
use simworld_kernel::World;

/// Draws a frame from the world's node transforms and the stage's cameras,
/// regions and lights. Implementations only read both.
pub trait Renderer {
    /// What one drawn frame looks like, e.g. text or an image.
    type Output;

    /// Render one frame.
    fn render(&self, world: &World, stage: &Stage) -> Self::Output;
}

/// Debug text renderer, a stand-in for a GPU backend.
///
/// Produces a human-readable description of what each active display region
/// would show. Useful for headless runs, logging, and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &World, stage: &Stage) -> String {
        let window = stage.window();
        let mut out = String::new();
        out.push_str(&format!(
            "=== {} {}x{} (frame={}) ===\n",
            window.title,
            window.width,
            window.height,
            world.tick()
        ));

        for region in stage.regions_in_draw_order() {
            if !region.active {
                continue;
            }
            let camera = region.camera.as_deref().and_then(|c| stage.camera(c));
            match camera.and_then(|c| Some((c, world.world_transform(c.node)?))) {
                Some((camera, t)) => {
                    let hpr = t.hpr();
                    out.push_str(&format!(
                        "Region [{}] sort={} camera={} eye=({:.2}, {:.2}, {:.2}) h={:.1} fov={:.0} aspect={:.3}\n",
                        region.name,
                        region.sort,
                        camera.name,
                        t.position.x,
                        t.position.y,
                        t.position.z,
                        hpr.x,
                        camera.lens.fov_degrees,
                        camera.lens.aspect
                    ));
                }
                None => {
                    out.push_str(&format!(
                        "Region [{}] sort={} camera=none\n",
                        region.name, region.sort
                    ));
                }
            }
        }

        let lit: Vec<&str> = stage
            .lights()
            .filter(|l| l.on)
            .map(|l| l.name.as_str())
            .collect();
        out.push_str(&format!("Lights on: [{}]\n", lit.join(", ")));

        out.push_str(&format!("Nodes: {}\n", world.entity_count()));
        for (id, data) in world.entities() {
            let Some(t) = world.world_transform(*id) else {
                continue;
            };
            out.push_str(&format!(
                "  [{}] {} pos=({:.2}, {:.2}, {:.2}) h={:.1}\n",
                id.short(),
                data.name,
                t.position.x,
                t.position.y,
                t.position.z,
                t.heading()
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{Lens, LightKind, WindowProps, DEFAULT_NAME};
    use glam::Vec3;
    use simworld_common::Transform;

    #[test]
    fn empty_stage_and_world() {
        let world = World::new();
        let stage = Stage::new(WindowProps::default());
        let output = DebugTextRenderer::new().render(&world, &stage);

        assert!(output.contains("frame=0"));
        assert!(output.contains("Region [default] sort=1 camera=none"));
        assert!(output.contains("Nodes: 0"));
    }

    #[test]
    fn camera_and_nodes_are_listed() {
        let mut world = World::new();
        let ball = world.spawn(
            "ball",
            Transform::from_pos_hpr(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO),
        );
        let cam = world.spawn_child("camera", ball, Transform::default()).unwrap();

        let mut stage = Stage::new(WindowProps::default());
        stage.add_camera("camera", cam, Lens::default()).unwrap();
        stage.activate_camera("camera").unwrap();
        stage.add_light("l", LightKind::Ambient, [1.0; 4]).unwrap();
        stage.toggle_light("l").unwrap();

        let output = DebugTextRenderer::new().render(&world, &stage);
        assert!(output.contains(&format!("Region [{DEFAULT_NAME}] sort=1 camera=camera eye=(0.00, 0.00, 10.00)")));
        assert!(output.contains("Lights on: [l]"));
        assert!(output.contains("Nodes: 2"));
        assert!(output.contains("ball pos=(0.00, 0.00, 10.00)"));
    }

    #[test]
    fn inactive_regions_are_skipped() {
        let world = World::new();
        let mut stage = Stage::new(WindowProps::default());
        stage.add_display_region("pip", [0.0, 0.5, 0.0, 0.5]).unwrap();
        let output = DebugTextRenderer::new().render(&world, &stage);
        assert!(!output.contains("Region [pip]"));
    }
}
