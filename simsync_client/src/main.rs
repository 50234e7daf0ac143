/**
 * Terminal front end for the simulation core
 *
 * Loads a hinged arm on a fixed stand, turns held keys into joint torque and
 * prints torque and joint velocity as status lines until esc is pressed.
 */

mod config;
mod demo;
mod keyboard;
mod logging;
mod text_plot;

use config::{ClientConfig, PLOT_TAIL};
use demo::{JOINT_NAME, held_torque, hinged_arm};
use keyboard::KeyboardInput;
use simsync_common::Rgb;
use simsync_module::visual::SeriesSpec;
use simsync_module::{LoadOptions, RapierEngine, SimConfig, Simulation, TorqueOptions};
use std::collections::VecDeque;
use std::error::Error;
use text_plot::TextPlotter;

/// Rolling (time, value) history of one plotted quantity
struct Trace {
    series: Option<usize>,
    t: VecDeque<f32>,
    y: VecDeque<f32>,
}

impl Trace {
    fn new(series: Option<usize>) -> Self {
        Trace { series, t: VecDeque::new(), y: VecDeque::new() }
    }

    fn push(&mut self, t: f32, y: f32) {
        if self.t.len() == PLOT_TAIL {
            self.t.pop_front();
            self.y.pop_front();
        }
        self.t.push_back(t);
        self.y.push_back(y);
    }

    fn clear(&mut self) {
        self.t.clear();
        self.y.clear();
    }

    fn publish(&mut self, sim: &mut Simulation<RapierEngine>) {
        if let Some(index) = self.series {
            sim.set_plot_data(index, self.t.make_contiguous(), self.y.make_contiguous());
        }
    }
}

fn run(client: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let config = SimConfig::from_env()?;
    let engine = RapierEngine::new(config.gravity, config.fixed_step, config.sub_steps);
    let mut sim = Simulation::new(engine, config)?
        .with_plotter(Box::new(TextPlotter::stdout(client.plot_fps)))
        .with_input(Box::new(KeyboardInput::new()?));

    let arm = sim.load_body(&hinged_arm()?, LoadOptions::at([0.0, 0.0, 1.0]).fixed(true))?;
    let mut torque = Trace::new(sim.add_plot(
        SeriesSpec::new("torque", "t [s]", "N·m").with_tail(PLOT_TAIL).with_color(Rgb::new(213, 94, 0)),
    ));
    let mut velocity = Trace::new(sim.add_plot(SeriesSpec::new("velocity", "t [s]", "rad/s").with_tail(PLOT_TAIL)));
    sim.open_plot_window();

    let keys = sim.config().clone();
    log::info!(
        "a/d: torque, shift for more | {}: reset | {}: quit",
        keys.reset_key,
        keys.terminate_key
    );

    let mut last_time = 0.0;
    while !sim.is_done() {
        let tau = held_torque(|key| sim.is_pressed(key));
        sim.set_joint_torque(arm, JOINT_NAME, tau, &TorqueOptions::default());
        sim.step(client.real_time, false, true);

        let now = sim.time();
        if now <= last_time {
            torque.clear();
            velocity.clear();
        }
        last_time = now;

        if let Some(state) = sim.get_joint_state(arm, JOINT_NAME) {
            torque.push(now as f32, state.applied_torque);
            velocity.push(now as f32, state.velocity);
            torque.publish(&mut sim);
            velocity.publish(&mut sim);
        }
    }
    log::info!("Stopped after {:.2} s of simulated time", sim.time());
    Ok(())
}

fn main() {
    let client = ClientConfig::from_env();
    logging::install(&client.log_filter);

    // The keyboard restores the terminal when `run` returns, before anything is reported
    if let Err(e) = run(&client) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
