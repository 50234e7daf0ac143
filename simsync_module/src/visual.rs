//! Renderer, plotter and input collaborator interfaces.
//!
//! The controller holds each as an optional boxed trait object fixed at
//! construction; an absent collaborator turns every call touching it into a
//! no-op.

use serde::{Deserialize, Serialize};
use simsync_common::{Rgb, Vec3, WxyzQuat};

/// Placement of a mesh, in renderer conventions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: WxyzQuat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: [0.0; 3],
            orientation: WxyzQuat::IDENTITY,
            scale: [1.0; 3],
        }
    }
}

/// Surface appearance of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Rgb,
    pub transparent: bool,
    pub opacity: f32,
}

impl Material {
    pub const fn opaque(color: Rgb) -> Self {
        Material { color, transparent: false, opacity: 1.0 }
    }

    /// Fully transparent black, used to hide arrows
    pub const HIDDEN: Material = Material { color: Rgb::BLACK, transparent: true, opacity: 0.0 };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshSource {
    /// Mesh file on disk
    File(String),
    /// Mesh shipped with the renderer (arrows)
    Builtin(String),
}

/// Global scene controls, forwarded untouched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SceneCommand {
    Camera { position: Vec3, target: Vec3, up: Vec3 },
    Background { top: Rgb, bottom: Rgb },
    Spotlight { on: bool, intensity: f32, distance: f32 },
    PosXPointLight { on: bool, intensity: f32, distance: f32 },
    NegXPointLight { on: bool, intensity: f32, distance: f32 },
    AmbientLight { on: bool, intensity: f32 },
    FillLight { on: bool, intensity: f32 },
}

/// Display metadata for one plotted series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: Rgb,
    pub line_width: f32,
    /// Number of trailing points kept on screen; `None` shows everything
    pub tail: Option<usize>,
    pub x_limits: Option<(f32, f32)>,
    pub y_limits: Option<(f32, f32)>,
}

impl SeriesSpec {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        SeriesSpec {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            color: Rgb::BLACK,
            line_width: 1.5,
            tail: None,
            x_limits: None,
            y_limits: None,
        }
    }

    pub fn with_tail(mut self, tail: usize) -> Self {
        self.tail = Some(tail);
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_y_limits(mut self, min: f32, max: f32) -> Self {
        self.y_limits = Some((min, max));
        self
    }
}

/// 3D scene renderer
pub trait Renderer {
    /// Create a named mesh inside a named group
    fn add_mesh(&mut self, group: &str, name: &str, mesh: &MeshSource, material: &Material, transform: &Transform);
    /// Move an existing mesh
    fn update_transform(&mut self, group: &str, name: &str, transform: &Transform);
    /// Recolor an existing mesh without touching its geometry
    fn update_material(&mut self, group: &str, name: &str, material: &Material);
    fn scene(&mut self, command: SceneCommand);
}

/// Real-time 2D plot viewer
pub trait Plotter {
    /// Register a series and return its index
    fn add_series(&mut self, spec: SeriesSpec) -> usize;
    /// Replace the whole data buffer of a series
    fn set_series_data(&mut self, index: usize, x: &[f32], y: &[f32]);
    fn series_count(&self) -> usize;
    /// Redraw one animation frame
    fn step(&mut self);
    fn flush_events(&mut self);
    /// Show the plot window
    fn open(&mut self);
}

/// Keyboard (or scripted) input
pub trait InputSource {
    /// Non-blocking: is the named key, with modifiers such as `"shift+w"`,
    /// held right now?
    fn is_pressed(&mut self, key: &str) -> bool;
}
