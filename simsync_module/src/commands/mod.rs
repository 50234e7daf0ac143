//! Per-body commands of a [`Simulation`](crate::controller::Simulation),
//! addressed by joint and link name.
//!
//! Mutators given a name the body does not have do nothing; accessors return
//! `None`. Commands that draw (arrows, coloring) do their physics part even
//! without a renderer.

mod coloring;
mod forces;
mod joints;
mod links;
mod plots;
mod scene;

pub use joints::TorqueOptions;
pub use links::BaseState;
