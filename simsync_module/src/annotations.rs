//! Force and torque arrows drawn over the bodies.
//!
//! Each [`AnnotationManager`] owns one key space. An arrow is created on the
//! first request that shows it and after that is only moved, rescaled, hidden
//! or shown again; it is never removed from the renderer.

use crate::constants::*;
use crate::visual::{Material, MeshSource, Renderer, Transform};
use simsync_common::frame::{self, DOWN, UP};
use simsync_common::{Rgb, Vec3, XyzwQuat};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowKind {
    /// Straight arrows for forces
    Linear,
    /// Curled arrows for torques
    Torque,
}

impl ArrowKind {
    pub fn group(self) -> &'static str {
        match self {
            ArrowKind::Linear => FORCE_ARROW_GROUP,
            ArrowKind::Torque => TORQUE_ARROW_GROUP,
        }
    }

    pub fn mesh(self) -> &'static str {
        match self {
            ArrowKind::Linear => FORCE_ARROW_MESH,
            ArrowKind::Torque => TORQUE_ARROW_MESH,
        }
    }

    pub fn default_scale(self) -> f32 {
        match self {
            ArrowKind::Linear => FORCE_ARROW_SCALE,
            ArrowKind::Torque => TORQUE_ARROW_SCALE,
        }
    }
}

/// Stable identity of an arrow within one manager
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationKey {
    Link(String),
    /// Loads applied at a body's center of mass
    CenterOfMass,
}

impl AnnotationKey {
    pub fn link(name: impl Into<String>) -> Self {
        AnnotationKey::Link(name.into())
    }
}

impl fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKey::Link(name) => f.write_str(name),
            AnnotationKey::CenterOfMass => f.write_str("COM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationState {
    Absent,
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationRecord {
    /// Creation order within the manager; the renderer-facing mesh name
    pub sequence: usize,
    pub visible: bool,
    /// Last transform pushed to the renderer
    pub transform: Transform,
}

/// What the arrow points along
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrowDirection {
    /// A force or torque vector; the arrow follows it and scales with its norm
    Vector(Vec3),
    /// A scalar torque about `axis`; the arrow points along the axis, flipped
    /// for negative torques, and scales with `|value|`
    Signed { axis: Vec3, value: f32 },
}

/// Geometry of one arrow request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowRequest {
    pub direction: ArrowDirection,
    /// World position of the arrow's tail
    pub anchor: Vec3,
    /// World orientation of the frame `direction` is expressed in
    pub frame: XyzwQuat,
    /// Arrow length per unit of magnitude
    pub scale: f32,
}

impl ArrowRequest {
    /// World-frame vector anchored at `anchor`
    pub fn world(vector: Vec3, anchor: Vec3, scale: f32) -> Self {
        ArrowRequest { direction: ArrowDirection::Vector(vector), anchor, frame: XyzwQuat::IDENTITY, scale }
    }

    /// Renderer transform of the arrow
    pub fn transform(&self) -> Transform {
        let (local, magnitude) = match self.direction {
            ArrowDirection::Vector(v) => (frame::rotation_between(UP, v), frame::norm(v)),
            ArrowDirection::Signed { axis, value } => {
                let from = if value < 0.0 { DOWN } else { UP };
                (frame::rotation_between(from, axis), value.abs())
            }
        };
        let size = self.scale * magnitude;
        Transform {
            position: self.anchor,
            orientation: frame::compose_in_frame(local, self.frame).to_wxyz(),
            scale: [size; 3],
        }
    }
}

/// Lifecycle table for one kind of arrow
#[derive(Debug, Clone)]
pub struct AnnotationManager {
    kind: ArrowKind,
    table: HashMap<AnnotationKey, AnnotationRecord>,
    next_sequence: usize,
}

impl AnnotationManager {
    pub fn new(kind: ArrowKind) -> Self {
        AnnotationManager { kind, table: HashMap::new(), next_sequence: 0 }
    }

    pub fn kind(&self) -> ArrowKind {
        self.kind
    }

    pub fn state(&self, key: &AnnotationKey) -> AnnotationState {
        match self.table.get(key) {
            None => AnnotationState::Absent,
            Some(record) if record.visible => AnnotationState::Visible,
            Some(_) => AnnotationState::Hidden,
        }
    }

    pub fn record(&self, key: &AnnotationKey) -> Option<&AnnotationRecord> {
        self.table.get(key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &AnnotationKey> {
        self.table.keys()
    }

    /// Show, move or hide the arrow under `key`.
    ///
    /// Without a renderer nothing happens, state included.
    pub fn request<R: Renderer + ?Sized>(
        &mut self,
        renderer: Option<&mut R>,
        key: AnnotationKey,
        show: bool,
        arrow: &ArrowRequest,
    ) {
        let Some(renderer) = renderer else {
            return;
        };
        let group = self.kind.group();

        if !show {
            if let Some(record) = self.table.get_mut(&key) {
                if record.visible {
                    renderer.update_material(group, &record.sequence.to_string(), &Material::HIDDEN);
                    record.visible = false;
                }
            }
            return;
        }

        let transform = arrow.transform();
        match self.table.get_mut(&key) {
            Some(record) => {
                let name = record.sequence.to_string();
                renderer.update_transform(group, &name, &transform);
                if !record.visible {
                    renderer.update_material(group, &name, &Material::opaque(Rgb::BLACK));
                    record.visible = true;
                }
                record.transform = transform;
            }
            None => {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                renderer.add_mesh(
                    group,
                    &sequence.to_string(),
                    &MeshSource::Builtin(self.kind.mesh().to_string()),
                    &Material::opaque(Rgb::BLACK),
                    &transform,
                );
                log::debug!("Created {:?} arrow #{} for {}", self.kind, sequence, key);
                self.table.insert(key, AnnotationRecord { sequence, visible: true, transform });
            }
        }
    }

    /// Hide every visible arrow, keeping all keys
    pub fn hide_all<R: Renderer + ?Sized>(&mut self, renderer: Option<&mut R>) {
        let Some(renderer) = renderer else {
            return;
        };
        let group = self.kind.group();
        for record in self.table.values_mut().filter(|r| r.visible) {
            renderer.update_material(group, &record.sequence.to_string(), &Material::HIDDEN);
            record.visible = false;
        }
    }
}
