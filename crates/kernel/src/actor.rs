use glam::Vec3;
use serde::{Deserialize, Serialize};
use simworld_common::{Axis, EntityId, Transform};

/// Default translational speed, in distance units per second.
pub const DEFAULT_MOVE_SPEED: f32 = 3.0;
/// Default rotational speed, in degrees per second.
pub const DEFAULT_TURN_SPEED: f32 = 30.0;

/// Control state of the actor of interest.
///
/// Input flips the direction flags; [`ActorMotion::integrate`] turns them into
/// a heading change and a forward displacement each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorMotion {
    /// Forward is positive, reverse negative.
    pub move_dir: Axis,
    /// Left is positive, right negative.
    pub turn_dir: Axis,
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl Default for ActorMotion {
    fn default() -> Self {
        Self {
            move_dir: Axis::Neutral,
            turn_dir: Axis::Neutral,
            move_speed: DEFAULT_MOVE_SPEED,
            turn_speed: DEFAULT_TURN_SPEED,
        }
    }
}

impl ActorMotion {
    pub fn with_speeds(move_speed: f32, turn_speed: f32) -> Self {
        Self {
            move_speed,
            turn_speed,
            ..Self::default()
        }
    }

    /// Heading change in degrees for a frame of `dt` seconds.
    pub fn heading_delta(&self, dt: f32) -> f32 {
        self.turn_speed * self.turn_dir.sign() * dt
    }

    /// Signed distance along local forward for a frame of `dt` seconds.
    pub fn travel(&self, dt: f32) -> f32 {
        self.move_speed * self.move_dir.sign() * dt
    }

    /// Apply one frame of motion to `transform`: turn first, then advance
    /// along the new local forward axis.
    pub fn integrate(&self, transform: &mut Transform, dt: f32) {
        let rotation = self.heading_delta(dt);
        if rotation != 0.0 {
            transform.turn_local(rotation);
        }
        let translation = self.travel(dt);
        if translation != 0.0 {
            transform.advance_local(translation);
        }
    }

    pub fn stop(&mut self) {
        self.move_dir = Axis::Neutral;
        self.turn_dir = Axis::Neutral;
    }
}

/// Read-only view of the actor of interest after a frame, handed to user
/// hooks and the trace logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: EntityId,
    pub name: String,
    pub frame_time: f64,
    pub position: Vec3,
    pub heading: f32,
    pub velocity: Vec3,
    pub motion: ActorMotion,
}

impl ActorSnapshot {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(move_dir: Axis, turn_dir: Axis, move_speed: f32, turn_speed: f32) -> ActorMotion {
        ActorMotion {
            move_dir,
            turn_dir,
            move_speed,
            turn_speed,
        }
    }

    #[test]
    fn defaults_are_stationary() {
        let m = ActorMotion::default();
        assert_eq!(m.move_dir, Axis::Neutral);
        assert_eq!(m.turn_dir, Axis::Neutral);
        assert_eq!(m.move_speed, DEFAULT_MOVE_SPEED);
        assert_eq!(m.turn_speed, DEFAULT_TURN_SPEED);
    }

    #[test]
    fn forward_seventy_units_in_one_second() {
        let m = moving(Axis::Positive, Axis::Neutral, 70.0, 100.0);
        let mut t = Transform::from_pos_hpr(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        m.integrate(&mut t, 1.0);
        assert!((t.position - Vec3::new(0.0, 70.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn right_turn_half_second_drops_heading_by_fifty() {
        let m = moving(Axis::Neutral, Axis::Negative, 70.0, 100.0);
        let mut t = Transform::default();
        let before = t.heading();
        m.integrate(&mut t, 0.5);
        assert!((t.heading() - (before - 50.0)).abs() < 1e-3);
    }

    #[test]
    fn displacement_magnitude_matches_speed() {
        let start = Transform::from_pos_hpr(Vec3::new(4.0, -2.0, 1.0), Vec3::new(33.0, 0.0, 0.0));
        for dir in [Axis::Negative, Axis::Neutral, Axis::Positive] {
            for dt in [0.0_f32, 0.016, 0.5, 2.0] {
                let m = moving(dir, Axis::Neutral, 12.5, 0.0);
                let mut t = start;
                m.integrate(&mut t, dt);
                let moved = (t.position - start.position).length();
                let expected = 12.5 * dir.sign().abs() * dt;
                assert!((moved - expected).abs() < 1e-4, "dir={dir:?} dt={dt}");
            }
        }
    }

    #[test]
    fn heading_delta_sign_matches_turn_dir() {
        let left = moving(Axis::Neutral, Axis::Positive, 0.0, 40.0);
        let right = moving(Axis::Neutral, Axis::Negative, 0.0, 40.0);
        assert_eq!(left.heading_delta(0.25), 10.0);
        assert_eq!(right.heading_delta(0.25), -10.0);
    }

    #[test]
    fn idle_motion_leaves_transform_unchanged() {
        let m = moving(Axis::Neutral, Axis::Neutral, 70.0, 100.0);
        let start = Transform::from_pos_hpr(Vec3::new(1.0, 2.0, 3.0), Vec3::new(17.0, 0.0, 0.0));
        for dt in [0.0, 0.1, 1000.0] {
            let mut t = start;
            m.integrate(&mut t, dt);
            assert_eq!(t, start);
        }
    }

    #[test]
    fn reverse_moves_backwards() {
        let m = moving(Axis::Negative, Axis::Neutral, 2.0, 0.0);
        let mut t = Transform::default();
        m.integrate(&mut t, 1.0);
        assert!((t.position - Vec3::new(0.0, -2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn stop_clears_both_axes() {
        let mut m = moving(Axis::Positive, Axis::Negative, 1.0, 1.0);
        m.stop();
        assert_eq!(m.move_dir, Axis::Neutral);
        assert_eq!(m.turn_dir, Axis::Neutral);
    }
}
