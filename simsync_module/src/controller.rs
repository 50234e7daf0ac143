//! The step/reset loop tying the engine, renderer, plotter and input together.

use crate::annotations::{AnnotationManager, ArrowKind};
use crate::config::SimConfig;
use crate::constants::KEY_POLL_INTERVAL_MS;
use crate::physics::{BodyDescription, JointControl, LinkState, PhysicsEngine, Pose, Velocity};
use crate::registry::{Body, InitialConditions};
use crate::visual::{InputSource, Material, MeshSource, Plotter, Renderer, Transform};
use simsync_common::{frame, BodyHandle, JointIndex, SimError, Vec3, XyzwQuat};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created or just reset; no step taken since
    Ready,
    Running,
    Terminated,
}

/// Where and how a body is loaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub pose: Pose,
    /// Pin the base in place
    pub fixed: bool,
    /// Push link transforms to the renderer on every visual sync
    pub track_visually: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions { pose: Pose::default(), fixed: false, track_visually: true }
    }
}

impl LoadOptions {
    pub fn at(position: Vec3) -> Self {
        LoadOptions { pose: Pose::at(position), ..Default::default() }
    }

    pub fn with_orientation(mut self, orientation: XyzwQuat) -> Self {
        self.pose.orientation = orientation;
        self
    }

    pub fn with_euler(self, roll: f32, pitch: f32, yaw: f32) -> Self {
        self.with_orientation(frame::from_euler(roll, pitch, yaw))
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn tracked(mut self, track_visually: bool) -> Self {
        self.track_visually = track_visually;
        self
    }
}

/// One simulation session.
///
/// Collaborators are fixed at construction: a missing renderer, plotter or
/// input source makes every call touching it a no-op.
pub struct Simulation<E: PhysicsEngine> {
    pub(crate) engine: E,
    pub(crate) config: SimConfig,
    pub(crate) renderer: Option<Box<dyn Renderer>>,
    pub(crate) plotter: Option<Box<dyn Plotter>>,
    input: Option<Box<dyn InputSource>>,
    pub(crate) bodies: Vec<Body>,
    pub(crate) force_arrows: AnnotationManager,
    pub(crate) torque_arrows: AnnotationManager,
    time: f64,
    last_wall_time: Option<Instant>,
    terminated: bool,
    running: bool,
}

impl<E: PhysicsEngine> Simulation<E> {
    pub fn new(mut engine: E, config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        engine.set_time_step(config.fixed_step);
        engine.set_gravity(config.gravity);
        Ok(Simulation {
            engine,
            config,
            renderer: None,
            plotter: None,
            input: None,
            bodies: Vec::new(),
            force_arrows: AnnotationManager::new(ArrowKind::Linear),
            torque_arrows: AnnotationManager::new(ArrowKind::Torque),
            time: 0.0,
            last_wall_time: None,
            terminated: false,
            running: false,
        })
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_plotter(mut self, plotter: Box<dyn Plotter>) -> Self {
        self.plotter = Some(plotter);
        self
    }

    pub fn with_input(mut self, input: Box<dyn InputSource>) -> Self {
        self.input = Some(input);
        self
    }

    /// Load a body, register its names and add its link meshes to the renderer
    pub fn load_body(&mut self, desc: &BodyDescription, options: LoadOptions) -> Result<BodyHandle, SimError> {
        let handle = self.engine.load_body(desc, options.pose, options.fixed)?;
        let initial = InitialConditions { pose: options.pose, fixed_base: options.fixed };
        let body = Body::register(&mut self.engine, handle, desc.name.clone(), initial, options.track_visually)?;

        if body.track_visually() {
            if let Some(renderer) = self.renderer.as_deref_mut() {
                let group = body.render_group();
                for shape in self.engine.visual_shapes(handle) {
                    let Some(state) = self.engine.link_state(handle, shape.link) else {
                        continue;
                    };
                    let material = Material { color: shape.color, transparent: shape.opacity < 1.0, opacity: shape.opacity };
                    renderer.add_mesh(
                        &group,
                        &shape.link_name,
                        &MeshSource::File(shape.mesh),
                        &material,
                        &link_transform(&state, shape.scale),
                    );
                }
            }
        }

        log::info!(
            "Loaded body '{}' as {} with {} joints (fixed base: {})",
            desc.name,
            handle,
            desc.joints.len(),
            options.fixed
        );
        self.bodies.push(body);
        Ok(handle)
    }

    /// Advance one fixed step, then sync visuals and plots and poll input.
    pub fn step(&mut self, real_time: bool, sync_visual: bool, sync_plots: bool) -> SessionState {
        if real_time {
            self.pace();
        }
        self.engine.step();
        self.last_wall_time = Some(Instant::now());
        self.time += f64::from(self.config.fixed_step);
        self.running = true;

        if sync_visual {
            self.sync_visual();
        }
        if sync_plots {
            if let Some(plotter) = self.plotter.as_mut() {
                plotter.step();
            }
        }
        self.poll_input(sync_visual, sync_plots);
        self.state()
    }

    /// Put every body back where it was loaded, zero all joints and clear the
    /// plots. Blocks for the configured cooldown before returning.
    pub fn reset(&mut self, sync_visual: bool, sync_plots: bool) {
        self.time = 0.0;
        self.terminated = false;
        self.running = false;

        for body in &self.bodies {
            let handle = body.handle();
            let initial = body.initial_conditions();
            self.engine.reset_base_pose(handle, initial.pose);
            self.engine.set_fixed_base(handle, initial.fixed_base);
            self.engine.reset_base_velocity(handle, Velocity::default());
            for joint in body.joint_indices() {
                self.engine.reset_joint_state(handle, joint, 0.0, 0.0);
                self.engine.set_joint_control(handle, joint, JointControl::Torque(0.0));
            }
        }
        self.force_arrows.hide_all(self.renderer.as_deref_mut());
        self.torque_arrows.hide_all(self.renderer.as_deref_mut());
        self.erase_all_plot_data();

        if sync_visual {
            self.sync_visual();
        }
        if sync_plots {
            if let Some(plotter) = self.plotter.as_mut() {
                plotter.step();
            }
        }
        log::info!("Simulation reset");

        if !self.config.reset_cooldown.is_zero() {
            thread::sleep(self.config.reset_cooldown);
        }
        self.last_wall_time = Some(Instant::now());
    }

    /// Is `key` held right now? Always false without an input source.
    pub fn is_pressed(&mut self, key: &str) -> bool {
        self.input.as_mut().is_some_and(|input| input.is_pressed(key))
    }

    /// Block until `key` is pressed, keeping the plot window responsive
    pub fn await_keypress(&mut self, key: &str) {
        let Some(input) = self.input.as_mut() else {
            log::warn!("No input source; not waiting for '{}'", key);
            return;
        };
        log::info!("Press {} to continue", key);
        loop {
            if let Some(plotter) = self.plotter.as_mut() {
                plotter.flush_events();
            }
            if input.is_pressed(key) {
                break;
            }
            thread::sleep(Duration::from_millis(KEY_POLL_INTERVAL_MS));
        }
    }

    /// [`await_keypress`](Self::await_keypress) on the configured continue key
    pub fn await_continue(&mut self) {
        let key = self.config.continue_key.clone();
        self.await_keypress(&key);
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.engine.set_gravity(gravity);
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn fixed_step(&self) -> f32 {
        self.config.fixed_step
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_done(&self) -> bool {
        self.terminated
    }

    pub fn state(&self) -> SessionState {
        if self.terminated {
            SessionState::Terminated
        } else if self.running {
            SessionState::Running
        } else {
            SessionState::Ready
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.iter().find(|b| b.handle() == handle)
    }

    pub fn force_arrows(&self) -> &AnnotationManager {
        &self.force_arrows
    }

    pub fn torque_arrows(&self) -> &AnnotationManager {
        &self.torque_arrows
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Joint index by name; logs and returns `None` when unknown
    pub(crate) fn joint_of(&self, body: BodyHandle, name: &str) -> Option<JointIndex> {
        let index = self.body(body).and_then(|b| b.joint_index(name));
        if index.is_none() {
            log::debug!("Body {} has no joint '{}'; ignoring", body, name);
        }
        index
    }

    /// Link index by name; logs and returns `None` when unknown
    pub(crate) fn link_of(&self, body: BodyHandle, name: &str) -> Option<JointIndex> {
        let index = self.body(body).and_then(|b| b.link_index(name));
        if index.is_none() {
            log::debug!("Body {} has no link '{}'; ignoring", body, name);
        }
        index
    }

    fn pace(&self) {
        let Some(last) = self.last_wall_time else {
            return;
        };
        let budget = self.config.fixed_step_duration();
        let elapsed = last.elapsed();
        if elapsed < budget {
            thread::sleep(budget - elapsed);
        } else {
            log::trace!("Step overran its real-time budget by {:?}", elapsed - budget);
        }
    }

    fn sync_visual(&mut self) {
        let Some(renderer) = self.renderer.as_deref_mut() else {
            return;
        };
        for body in self.bodies.iter().filter(|b| b.track_visually()) {
            let group = body.render_group();
            for link in body.visual_links() {
                if let Some(state) = self.engine.link_state(body.handle(), link.index) {
                    renderer.update_transform(&group, &link.name, &link_transform(&state, link.scale));
                }
            }
        }
    }

    fn poll_input(&mut self, sync_visual: bool, sync_plots: bool) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        let reset = input.is_pressed(&self.config.reset_key);
        let terminate = input.is_pressed(&self.config.terminate_key);
        if reset {
            self.reset(sync_visual, sync_plots);
        }
        if terminate && !self.terminated {
            log::info!("Terminated at t = {:.3} s", self.time);
            self.terminated = true;
        }
    }
}

/// Renderer placement of a link
pub(crate) fn link_transform(state: &LinkState, scale: Vec3) -> Transform {
    Transform {
        position: state.frame_position,
        orientation: state.orientation.to_wxyz(),
        scale,
    }
}
