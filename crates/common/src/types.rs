use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one node of the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Local placement of a node relative to its parent.
///
/// The world is Z-up. An entity's local forward axis is +Y, and heading is
/// the rotation about +Z in degrees (positive turns left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Build a transform from a position and heading/pitch/roll in degrees.
    pub fn from_pos_hpr(position: Vec3, hpr: Vec3) -> Self {
        Self {
            position,
            rotation: hpr_to_quat(hpr),
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Heading/pitch/roll in degrees. Heading lies in (-180, 180].
    pub fn hpr(&self) -> Vec3 {
        let (h, p, r) = self.rotation.to_euler(EulerRot::ZXY);
        Vec3::new(h.to_degrees(), p.to_degrees(), r.to_degrees())
    }

    pub fn heading(&self) -> f32 {
        self.hpr().x
    }

    /// Unit vector along the local +Y axis, in parent space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Rotate about the local up axis by `degrees`.
    pub fn turn_local(&mut self, degrees: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_z(degrees.to_radians())).normalize();
    }

    /// Move along the local forward axis by `distance` units.
    pub fn advance_local(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    /// Express `child` (given relative to `self`) in `self`'s parent space.
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale * child.position),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }
}

fn hpr_to_quat(hpr: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::ZXY,
        hpr.x.to_radians(),
        hpr.y.to_radians(),
        hpr.z.to_radians(),
    )
}

/// Tri-state direction flag used by the move and turn axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl Axis {
    pub fn sign(self) -> f32 {
        match self {
            Self::Negative => -1.0,
            Self::Neutral => 0.0,
            Self::Positive => 1.0,
        }
    }
}

/// Returned when converting an integer outside {-1, 0, 1} into an [`Axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("axis value must be -1, 0 or 1, got {0}")]
pub struct InvalidAxis(pub i32);

impl TryFrom<i32> for Axis {
    type Error = InvalidAxis;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Negative),
            0 => Ok(Self::Neutral),
            1 => Ok(Self::Positive),
            other => Err(InvalidAxis(other)),
        }
    }
}

impl From<Axis> for i32 {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Negative => -1,
            Axis::Neutral => 0,
            Axis::Positive => 1,
        }
    }
}
