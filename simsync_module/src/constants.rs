/// Physics time step in seconds
pub const DEFAULT_FIXED_STEP: f32 = 0.01;

/// Pipeline steps per fixed step
pub const DEFAULT_SUB_STEPS: usize = 4;

pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, 0.0, -9.81];

/// Wall-clock pause after a reset so one key press triggers one reset
pub const RESET_COOLDOWN_MS: u64 = 500;

/// Max force/torque used by position and velocity control
pub const DEFAULT_MAX_FORCE: f32 = 1000.0;

// Joint motor gains
pub const VELOCITY_MOTOR_GAIN: f32 = 100.0;
pub const POSITION_MOTOR_STIFFNESS: f32 = 1000.0;
pub const POSITION_MOTOR_DAMPING: f32 = 100.0;

/// Friction coefficient applied to every link at load ("metal on metal")
pub const LINK_LATERAL_FRICTION: f32 = 1.0;
pub const LINK_RESTITUTION: f32 = 0.5;

/// Arrow length per unit of force
pub const FORCE_ARROW_SCALE: f32 = 0.4;
/// Arrow length per unit of torque
pub const TORQUE_ARROW_SCALE: f32 = 0.1;

/// Renderer group holding force arrows
pub const FORCE_ARROW_GROUP: &str = "Force Arrows";
/// Renderer group holding torque arrows
pub const TORQUE_ARROW_GROUP: &str = "Torque Arrows";
pub const FORCE_ARROW_MESH: &str = "arrow_lin";
pub const TORQUE_ARROW_MESH: &str = "arrow_ccw";

/// Default coloring ranges
pub const VELOCITY_COLOR_RANGE: (f32, f32) = (-100.0, 100.0);
pub const TORQUE_COLOR_RANGE: (f32, f32) = (-1.0, 1.0);

pub const RESET_KEY: &str = "tab";
pub const TERMINATE_KEY: &str = "esc";
pub const CONTINUE_KEY: &str = "enter";

/// Input polling period while blocked on a key
pub const KEY_POLL_INTERVAL_MS: u64 = 10;
