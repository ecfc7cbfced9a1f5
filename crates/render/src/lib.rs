//! Rendering adapter: the stage the sandbox configures and a
//! renderer-agnostic interface that reads it.
//!
//! # Invariants
//! - Renderer cannot mutate world truth or the stage.
//! - Exactly one display region is "of interest" at any time.
//!
//! # Workaround
//! Ships a debug text renderer in place of a GPU backend. The trait is
//! stable; a real backend implements it without changing the sandbox.

mod overlay;
mod renderer;
mod stage;

pub use overlay::OnScreenText;
pub use renderer::{DebugTextRenderer, Renderer};
pub use stage::{
    Camera, DEFAULT_NAME, DisplayRegion, Lens, Light, LightKind, Stage, StageError, WindowProps,
};
