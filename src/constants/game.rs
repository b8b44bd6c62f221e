// World units; the viewport spans [0, VIEWPORT_WIDTH) x [0, VIEWPORT_HEIGHT).
pub const VIEWPORT_WIDTH: i32 = 800;
pub const VIEWPORT_HEIGHT: i32 = 600;

pub const GRAVITY: f64 = 0.25;
pub const JUMP_SPEED: f64 = 5.0;

pub const BIRD_X: i32 = 10;
pub const BIRD_SPAWN_HEIGHT: f64 = 300.0;
pub const BIRD_WIDTH: i32 = 50;
pub const BIRD_HEIGHT: i32 = 43;
pub const BIRD_FRAME_TICKS: u32 = 10;

pub const PIPE_WIDTH: i32 = 50;
pub const PIPE_SPEED: i32 = 2;
pub const PIPE_GAP_MIN: i32 = 100;
pub const PIPE_GAP_MAX: i32 = 400;

pub const TICK_RATE: f64 = 100.0;
pub const SPAWN_INTERVAL_MS: u64 = 1000;
pub const GAME_OVER_DELAY_MS: u64 = 1000;
pub const TITLE_DELAY_MS: u64 = 2000;
