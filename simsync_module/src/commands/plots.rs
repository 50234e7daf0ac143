use crate::controller::Simulation;
use crate::physics::PhysicsEngine;
use crate::visual::SeriesSpec;

impl<E: PhysicsEngine> Simulation<E> {
    /// Register a plot series; `None` without a plotter
    pub fn add_plot(&mut self, spec: SeriesSpec) -> Option<usize> {
        let plotter = self.plotter.as_mut()?;
        let index = plotter.add_series(spec);
        log::debug!("Added plot series {}", index);
        Some(index)
    }

    /// Replace the data of series `index`
    pub fn set_plot_data(&mut self, index: usize, x: &[f32], y: &[f32]) {
        if let Some(plotter) = self.plotter.as_mut() {
            plotter.set_series_data(index, x, y);
        }
    }

    /// Empty every series, keeping the series themselves
    pub fn erase_all_plot_data(&mut self) {
        if let Some(plotter) = self.plotter.as_mut() {
            for index in 0..plotter.series_count() {
                plotter.set_series_data(index, &[], &[]);
            }
        }
    }

    pub fn open_plot_window(&mut self) {
        match self.plotter.as_mut() {
            Some(plotter) => plotter.open(),
            None => log::warn!("No plotter attached; nothing to open"),
        }
    }
}
