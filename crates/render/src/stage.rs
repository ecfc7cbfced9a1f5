use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use simworld_common::EntityId;

/// Name of the camera and display region that exist from startup.
pub const DEFAULT_NAME: &str = "default";

/// Sort value of the default display region.
const DEFAULT_REGION_SORT: i32 = 1;
/// Sort value of regions added later; they draw over the default one.
const OVERLAY_REGION_SORT: i32 = 99;

/// Errors from stage operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageError {
    #[error("unknown camera '{0}'")]
    UnknownCamera(String),
    #[error("unknown display region '{0}'")]
    UnknownRegion(String),
    #[error("unknown light '{0}'")]
    UnknownLight(String),
    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },
    #[error("display region bounds {0:?} must satisfy 0 <= left < right <= 1 and 0 <= bottom < top <= 1")]
    InvalidBounds([f32; 4]),
    #[error("display region '{0}' has zero pixel height")]
    ZeroHeight(String),
}

/// Window properties requested at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowProps {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowProps {
    fn default() -> Self {
        Self {
            title: "simworld".into(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Perspective lens parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_degrees: 40.0,
            aspect: 4.0 / 3.0,
            near: 1.0,
            far: 100_000.0,
        }
    }
}

/// A camera bound to a scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    /// Scene node carrying the camera's transform.
    pub node: EntityId,
    pub lens: Lens,
    pub active: bool,
}

/// A rectangle of the window that one camera draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRegion {
    pub name: String,
    /// Left, right, bottom, top as window fractions.
    pub lrbt: [f32; 4],
    pub sort: i32,
    pub active: bool,
    pub camera: Option<String>,
}

impl DisplayRegion {
    /// Size in pixels for a window of `width` × `height`.
    pub fn pixel_size(&self, width: u32, height: u32) -> (u32, u32) {
        let [l, r, b, t] = self.lrbt;
        let w = ((r - l) * width as f32).round() as u32;
        let h = ((t - b) * height as f32).round() as u32;
        (w, h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LightKind {
    Ambient,
    Point { position: Vec3 },
    Directional { position: Vec3, direction: Vec3 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub color: [f32; 4],
    /// Whether the light currently illuminates the scene.
    pub on: bool,
}

/// Cameras, display regions, and lights the sandbox has configured, plus the
/// display region of interest.
#[derive(Debug, Clone)]
pub struct Stage {
    window: WindowProps,
    cameras: BTreeMap<String, Camera>,
    regions: BTreeMap<String, DisplayRegion>,
    lights: BTreeMap<String, Light>,
    region_of_interest: String,
    pub background: [f32; 4],
}

impl Stage {
    /// A stage with only the full-window `default` region, selected and
    /// active, with no camera yet.
    pub fn new(window: WindowProps) -> Self {
        let mut regions = BTreeMap::new();
        regions.insert(
            DEFAULT_NAME.to_string(),
            DisplayRegion {
                name: DEFAULT_NAME.to_string(),
                lrbt: [0.0, 1.0, 0.0, 1.0],
                sort: DEFAULT_REGION_SORT,
                active: true,
                camera: None,
            },
        );
        Self {
            window,
            cameras: BTreeMap::new(),
            regions,
            lights: BTreeMap::new(),
            region_of_interest: DEFAULT_NAME.to_string(),
            background: [0.1, 0.1, 0.1, 0.0],
        }
    }

    pub fn window(&self) -> &WindowProps {
        &self.window
    }

    /// Track a window resize; region pixel sizes follow.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window.width = width;
        self.window.height = height;
    }

    // --- Cameras ---

    pub fn add_camera(&mut self, name: &str, node: EntityId, lens: Lens) -> Result<(), StageError> {
        if self.cameras.contains_key(name) {
            return Err(StageError::Duplicate {
                kind: "camera",
                name: name.to_string(),
            });
        }
        self.cameras.insert(
            name.to_string(),
            Camera {
                name: name.to_string(),
                node,
                lens,
                active: false,
            },
        );
        Ok(())
    }

    pub fn camera(&self, name: &str) -> Option<&Camera> {
        self.cameras.get(name)
    }

    pub fn cameras(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.values()
    }

    /// Put camera `name` on the display region of interest. The lens aspect
    /// ratio is fitted to the region's pixel size.
    pub fn activate_camera(&mut self, name: &str) -> Result<(), StageError> {
        let region = self
            .regions
            .get_mut(&self.region_of_interest)
            .ok_or_else(|| StageError::UnknownRegion(self.region_of_interest.clone()))?;
        let camera = self
            .cameras
            .get_mut(name)
            .ok_or_else(|| StageError::UnknownCamera(name.to_string()))?;

        let (w, h) = region.pixel_size(self.window.width, self.window.height);
        if h == 0 {
            return Err(StageError::ZeroHeight(region.name.clone()));
        }
        camera.lens.aspect = w as f32 / h as f32;
        camera.active = true;
        region.camera = Some(name.to_string());
        tracing::info!(camera = name, region = %region.name, aspect = camera.lens.aspect, "camera activated");
        Ok(())
    }

    /// Assign a camera to a region without touching the region of interest.
    pub fn attach_camera(&mut self, camera: &str, region: &str) -> Result<(), StageError> {
        if !self.cameras.contains_key(camera) {
            return Err(StageError::UnknownCamera(camera.to_string()));
        }
        let region = self
            .regions
            .get_mut(region)
            .ok_or_else(|| StageError::UnknownRegion(region.to_string()))?;
        region.camera = Some(camera.to_string());
        Ok(())
    }

    // --- Display regions ---

    /// Add an inactive region drawn above the default one.
    pub fn add_display_region(&mut self, name: &str, lrbt: [f32; 4]) -> Result<(), StageError> {
        let [l, r, b, t] = lrbt;
        let valid = (0.0..=1.0).contains(&l)
            && (0.0..=1.0).contains(&r)
            && (0.0..=1.0).contains(&b)
            && (0.0..=1.0).contains(&t)
            && l < r
            && b < t;
        if !valid {
            return Err(StageError::InvalidBounds(lrbt));
        }
        if self.regions.contains_key(name) {
            return Err(StageError::Duplicate {
                kind: "display region",
                name: name.to_string(),
            });
        }
        self.regions.insert(
            name.to_string(),
            DisplayRegion {
                name: name.to_string(),
                lrbt,
                sort: OVERLAY_REGION_SORT,
                active: false,
                camera: None,
            },
        );
        Ok(())
    }

    pub fn region(&self, name: &str) -> Option<&DisplayRegion> {
        self.regions.get(name)
    }

    /// Regions in draw order (ascending sort, then name).
    pub fn regions_in_draw_order(&self) -> Vec<&DisplayRegion> {
        let mut regions: Vec<_> = self.regions.values().collect();
        regions.sort_by_key(|r| r.sort);
        regions
    }

    pub fn region_of_interest(&self) -> &str {
        &self.region_of_interest
    }

    /// Select region `name` for region-scoped operations and activate it.
    pub fn set_region_of_interest(&mut self, name: &str) -> Result<(), StageError> {
        let region = self
            .regions
            .get_mut(name)
            .ok_or_else(|| StageError::UnknownRegion(name.to_string()))?;
        region.active = true;
        self.region_of_interest = name.to_string();
        Ok(())
    }

    pub fn activate_region(&mut self, name: &str, active: bool) -> Result<(), StageError> {
        let region = self
            .regions
            .get_mut(name)
            .ok_or_else(|| StageError::UnknownRegion(name.to_string()))?;
        region.active = active;
        Ok(())
    }

    /// Flip a region's active flag; `None` targets the region of interest.
    /// Returns the new state.
    pub fn toggle_region(&mut self, name: Option<&str>) -> Result<bool, StageError> {
        let name = name.unwrap_or(&self.region_of_interest).to_string();
        let region = self
            .regions
            .get_mut(&name)
            .ok_or(StageError::UnknownRegion(name))?;
        region.active = !region.active;
        Ok(region.active)
    }

    // --- Lights ---

    /// Register a light. New lights start off.
    pub fn add_light(&mut self, name: &str, kind: LightKind, color: [f32; 4]) -> Result<(), StageError> {
        if self.lights.contains_key(name) {
            return Err(StageError::Duplicate {
                kind: "light",
                name: name.to_string(),
            });
        }
        self.lights.insert(
            name.to_string(),
            Light {
                name: name.to_string(),
                kind,
                color,
                on: false,
            },
        );
        Ok(())
    }

    pub fn light(&self, name: &str) -> Option<&Light> {
        self.lights.get(name)
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.lights.values()
    }

    pub fn activate_light(&mut self, name: &str, on: bool) -> Result<(), StageError> {
        let light = self
            .lights
            .get_mut(name)
            .ok_or_else(|| StageError::UnknownLight(name.to_string()))?;
        light.on = on;
        Ok(())
    }

    /// Flip a light on or off. Returns the new state.
    pub fn toggle_light(&mut self, name: &str) -> Result<bool, StageError> {
        let light = self
            .lights
            .get_mut(name)
            .ok_or_else(|| StageError::UnknownLight(name.to_string()))?;
        light.on = !light.on;
        Ok(light.on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage() -> Stage {
        Stage::new(WindowProps {
            width: 1680,
            height: 1050,
            ..WindowProps::default()
        })
    }

    #[test]
    fn default_region_is_selected_and_active() {
        let s = stage();
        assert_eq!(s.region_of_interest(), DEFAULT_NAME);
        let r = s.region(DEFAULT_NAME).unwrap();
        assert!(r.active);
        assert_eq!(r.sort, 1);
    }

    #[test]
    fn activate_camera_fits_aspect_to_region() {
        let mut s = stage();
        let node = EntityId::new();
        s.add_camera("camera", node, Lens::default()).unwrap();
        s.activate_camera("camera").unwrap();
        let cam = s.camera("camera").unwrap();
        assert!(cam.active);
        assert!((cam.lens.aspect - 1680.0 / 1050.0).abs() < 1e-6);
        assert_eq!(s.region(DEFAULT_NAME).unwrap().camera.as_deref(), Some("camera"));
    }

    #[test]
    fn activate_camera_uses_region_of_interest() {
        let mut s = stage();
        s.add_camera("pip_cam", EntityId::new(), Lens::default()).unwrap();
        s.add_display_region("pip", [0.7, 1.0, 0.7, 1.0]).unwrap();
        s.set_region_of_interest("pip").unwrap();
        s.activate_camera("pip_cam").unwrap();
        assert_eq!(s.region("pip").unwrap().camera.as_deref(), Some("pip_cam"));
        assert!(s.region(DEFAULT_NAME).unwrap().camera.is_none());
        // 504 x 315 pixels
        assert!((s.camera("pip_cam").unwrap().lens.aspect - 1.6).abs() < 1e-4);
    }

    #[test]
    fn unknown_camera_is_an_error() {
        let mut s = stage();
        assert_eq!(
            s.activate_camera("nope"),
            Err(StageError::UnknownCamera("nope".into()))
        );
    }

    #[test]
    fn new_regions_start_inactive_on_top() {
        let mut s = stage();
        s.add_display_region("pip", [0.0, 0.25, 0.0, 0.25]).unwrap();
        let r = s.region("pip").unwrap();
        assert!(!r.active);
        assert_eq!(r.sort, 99);
        let order: Vec<_> = s.regions_in_draw_order().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["default", "pip"]);
    }

    #[test]
    fn region_bounds_validated() {
        let mut s = stage();
        assert!(matches!(
            s.add_display_region("bad", [0.5, 0.2, 0.0, 1.0]),
            Err(StageError::InvalidBounds(_))
        ));
        assert!(matches!(
            s.add_display_region("big", [0.0, 1.5, 0.0, 1.0]),
            Err(StageError::InvalidBounds(_))
        ));
    }

    #[test]
    fn selecting_region_activates_it() {
        let mut s = stage();
        s.add_display_region("pip", [0.0, 0.5, 0.0, 0.5]).unwrap();
        s.set_region_of_interest("pip").unwrap();
        assert_eq!(s.region_of_interest(), "pip");
        assert!(s.region("pip").unwrap().active);
    }

    #[test]
    fn toggle_region_defaults_to_region_of_interest() {
        let mut s = stage();
        assert_eq!(s.toggle_region(None), Ok(false));
        assert_eq!(s.toggle_region(None), Ok(true));
        assert!(s.toggle_region(Some("missing")).is_err());
    }

    #[test]
    fn lights_toggle() {
        let mut s = stage();
        s.add_light("ambient", LightKind::Ambient, [1.0; 4]).unwrap();
        assert!(!s.light("ambient").unwrap().on);
        assert_eq!(s.toggle_light("ambient"), Ok(true));
        s.activate_light("ambient", false).unwrap();
        assert!(!s.light("ambient").unwrap().on);
        assert!(matches!(
            s.add_light("ambient", LightKind::Ambient, [1.0; 4]),
            Err(StageError::Duplicate { .. })
        ));
    }

    #[test]
    fn resize_changes_aspect_on_next_activation() {
        let mut s = stage();
        s.add_camera("c", EntityId::new(), Lens::default()).unwrap();
        s.resize(800, 800);
        s.activate_camera("c").unwrap();
        assert_eq!(s.camera("c").unwrap().lens.aspect, 1.0);
    }
}
