//! Simulation core: keeps a rigid-body engine, a 3D renderer and a plot viewer
//! in step, and draws force/torque arrows and property colors over the bodies.

pub mod annotations;
pub mod commands;
pub mod config;
pub mod constants;
pub mod controller;
pub mod physics;
pub mod registry;
pub mod visual;


pub use annotations::{AnnotationKey, AnnotationManager, AnnotationState, ArrowKind};
pub use commands::{BaseState, TorqueOptions};
pub use config::SimConfig;
pub use controller::{LoadOptions, SessionState, Simulation};
pub use physics::{BodyDescription, JointDescription, JointKind, LinkDescription, PhysicsEngine, Pose, RapierEngine};
pub use registry::Body;
