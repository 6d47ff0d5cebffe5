pub const TICK_MS: u64 = 150;
pub const MIN_TICK_MS: u64 = 16;
pub const MAX_TICK_MS: u64 = 2_000;

/// Ticks a power pill keeps the player empowered.
pub const PILL_MAX: u32 = 30;
pub const AUTOMATION_BATCH: u32 = 100;

pub const GHOST_PEN_TICKS: u32 = 12;
/// Line-of-sight distance at which a ghost commits to chasing the player.
pub const GHOST_CHASE_RANGE: u32 = 10;

pub const PRIORITY_BLOCKED: f64 = -28_934_834.0;
pub const PRIORITY_FLEE_BASE: f64 = -1.0;
pub const PRIORITY_HUNT_BASE: f64 = 5.0;
pub const PRIORITY_PILL: f64 = 3.0;
pub const PRIORITY_BISCUIT_BASE: f64 = 2.0;
pub const PRIORITY_POWERED_IDLE: f64 = 1.0;
pub const PRIORITY_DISTANCE_STEP: f64 = 0.01;
pub const PRIORITY_JITTER: f64 = 0.001;

pub const DEFAULT_MAX_TURNS_PER_ROUND: u64 = 5_000;
