/**
 * Terminal front end configuration
 *
 */

/// Pace steps against the wall clock
pub const ENV_REAL_TIME: &str = "SIMSYNC_REAL_TIME";

/// Status lines printed per second by the text plotter
pub const ENV_PLOT_FPS: &str = "SIMSYNC_PLOT_FPS";

/// Log filter directives, e.g. `debug` or `info,simsync_module=trace`
pub const ENV_LOG: &str = "SIMSYNC_LOG";

pub const DEFAULT_PLOT_FPS: f32 = 10.0;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Samples kept per plotted series
pub const PLOT_TAIL: usize = 500;

/// How long a key counts as held after its last press event when the
/// terminal does not report releases
pub const KEY_HOLD_MS: u64 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub real_time: bool,
    pub plot_fps: f32,
    /// Checked when the subscriber is installed
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            real_time: true,
            plot_fps: DEFAULT_PLOT_FPS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Unparsable values keep their defaults; the client reports them and carries on
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();
        if let Some(raw) = lookup(ENV_REAL_TIME) {
            match parse_flag(&raw) {
                Some(flag) => config.real_time = flag,
                None => eprintln!("Ignoring {}={:?}: expected a boolean", ENV_REAL_TIME, raw),
            }
        }
        if let Some(raw) = lookup(ENV_PLOT_FPS) {
            match raw.trim().parse::<f32>() {
                Ok(fps) if fps > 0.0 && fps.is_finite() => config.plot_fps = fps,
                _ => eprintln!("Ignoring {}={:?}: expected a positive number", ENV_PLOT_FPS, raw),
            }
        }
        if let Some(raw) = lookup(ENV_LOG) {
            if !raw.trim().is_empty() {
                config.log_filter = raw.trim().to_string();
            }
        }
        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
