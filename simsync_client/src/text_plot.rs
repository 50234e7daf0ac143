use simsync_module::visual::{Plotter, SeriesSpec};
use std::io::Write;
use std::time::{Duration, Instant};

struct Series {
    spec: SeriesSpec,
    x: Vec<f32>,
    y: Vec<f32>,
}

/// [`Plotter`] that prints the latest sample of every series as one status
/// line, at most `fps` times per second.
pub struct TextPlotter<W: Write> {
    out: W,
    series: Vec<Series>,
    interval: Duration,
    last_print: Option<Instant>,
}

impl TextPlotter<std::io::Stdout> {
    pub fn stdout(fps: f32) -> Self {
        TextPlotter::new(std::io::stdout(), fps)
    }
}

impl<W: Write> TextPlotter<W> {
    pub fn new(out: W, fps: f32) -> Self {
        let interval = if fps > 0.0 { Duration::from_secs_f32(1.0 / fps) } else { Duration::ZERO };
        TextPlotter { out, series: Vec::new(), interval, last_print: None }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn status_line(&self) -> String {
        let mut line = String::new();
        if let Some(t) = self.series.iter().find_map(|s| s.x.last()) {
            line.push_str(&format!("{:>8.2}", t));
        }
        for s in &self.series {
            match s.y.last() {
                Some(y) => line.push_str(&format!(" | {} {:>9.3}", s.spec.title, y)),
                None => line.push_str(&format!(" | {} {:>9}", s.spec.title, "-")),
            }
        }
        line
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = write!(self.out, "{}\r\n", line) {
            log::warn!("Writing plot output failed: {}", e);
        }
    }
}

impl<W: Write> Plotter for TextPlotter<W> {
    fn add_series(&mut self, spec: SeriesSpec) -> usize {
        self.series.push(Series { spec, x: Vec::new(), y: Vec::new() });
        self.series.len() - 1
    }

    fn set_series_data(&mut self, index: usize, x: &[f32], y: &[f32]) {
        let Some(series) = self.series.get_mut(index) else {
            log::debug!("No plot series {}", index);
            return;
        };
        let len = x.len().min(y.len());
        let start = series.spec.tail.map_or(0, |tail| len.saturating_sub(tail));
        series.x = x[start..len].to_vec();
        series.y = y[start..len].to_vec();
    }

    fn series_count(&self) -> usize {
        self.series.len()
    }

    fn step(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_print {
            if now.saturating_duration_since(last) < self.interval {
                return;
            }
        }
        self.last_print = Some(now);
        let line = self.status_line();
        self.write_line(&line);
    }

    fn flush_events(&mut self) {
        let _ = self.out.flush();
    }

    fn open(&mut self) {
        let header: Vec<String> = self
            .series
            .iter()
            .map(|s| format!("{} ({} vs {})", s.spec.title, s.spec.y_label, s.spec.x_label))
            .collect();
        self.write_line(&format!("plots: {}", header.join(", ")));
    }
}
