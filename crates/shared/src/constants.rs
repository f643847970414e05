// Tick rate
pub const TICK_RATE: u32 = 20;

// Vehicle geometry (map units, degrees)
pub const CAR_RADIUS: f64 = 3.0;
pub const WHEELBASE: f64 = 2.0 * CAR_RADIUS;
pub const WHEEL_ANGLE_LIMIT: f64 = 40.0;

// Radar directions relative to the heading, in degrees
pub const RADAR_FRONT_OFFSET: f64 = 0.0;
pub const RADAR_RIGHT_OFFSET: f64 = -45.0;
pub const RADAR_LEFT_OFFSET: f64 = 45.0;

// Distance reported when a ray escapes the walls. Large but finite so
// downstream arithmetic stays well-defined.
pub const NO_HIT_DISTANCE: f64 = 1e4;

// Training defaults
pub const DEFAULT_ITERATIONS: usize = 300;
pub const DEFAULT_POPULATION: usize = 100;
pub const DEFAULT_NNEURON: usize = 6;
pub const DEFAULT_SD_MAX: f64 = 10.0;
pub const DEFAULT_INERTIA: f64 = 0.72;
pub const DEFAULT_COGNITIVE: f64 = 1.49;
pub const DEFAULT_SOCIAL: f64 = 1.49;

// Lower bound kept on every spread component during optimization
pub const SPREAD_FLOOR: f64 = 1e-3;

// Simulation run budget
pub const DEFAULT_MAX_TICKS: u32 = 2000;
