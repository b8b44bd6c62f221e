use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::pipe::Pipe;
use crate::{
    config::GameConfig,
    error::RenderError,
    render::{Canvas, Flip, ScreenRect, Texture},
};

#[derive(Debug, Clone, PartialEq)]
struct BirdState {
    time: u32,
    y: f64,
    speed: f64,
    dead: bool,
}

/// The player. `y` is the height of the sprite's center above the ground and
/// a positive speed means falling.
#[derive(Debug)]
pub struct Bird {
    state: RwLock<BirdState>,
    x: i32,
    width: i32,
    height: i32,
    spawn_height: f64,
    gravity: f64,
    jump_speed: f64,
    frame_ticks: u32,
    viewport_height: i32,
}

impl Bird {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            state: RwLock::new(BirdState { time: 0, y: config.bird_spawn_height, speed: 0.0, dead: false }),
            x: config.bird_x,
            width: config.bird_width,
            height: config.bird_height,
            spawn_height: config.bird_spawn_height,
            gravity: config.gravity,
            jump_speed: config.jump_speed,
            frame_ticks: config.bird_frame_ticks.max(1),
            viewport_height: config.viewport_height,
        }
    }

    // A panic while holding the lock cannot leave the plain-data state torn.
    fn read(&self) -> RwLockReadGuard<'_, BirdState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BirdState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update(&self) {
        let mut state = self.write();
        state.time = state.time.wrapping_add(1);
        state.y -= state.speed;
        if state.y < 0.0 {
            state.y = 0.0;
            state.dead = true;
        }
        state.speed += self.gravity;
    }

    pub fn jump(&self) {
        self.write().speed = -self.jump_speed;
    }

    pub fn is_dead(&self) -> bool {
        self.read().dead
    }

    pub fn position(&self) -> f64 {
        self.read().y
    }

    pub fn velocity(&self) -> f64 {
        self.read().speed
    }

    pub fn restart(&self) {
        let mut state = self.write();
        state.y = self.spawn_height;
        state.speed = 0.0;
        state.dead = false;
    }

    pub fn touch(&self, pipe: &Pipe) {
        let mut state = self.write();
        if self.collides(state.y, pipe) {
            state.dead = true;
        }
    }

    fn collides(&self, y: f64, pipe: &Pipe) -> bool {
        // Closed spans: sharing an edge counts as touching.
        if pipe.x() > self.x + self.width || pipe.x() + pipe.width() < self.x {
            return false;
        }

        let half = self.height as f64 / 2.0;
        let gap = pipe.gap() as f64;
        if pipe.is_inverted() {
            y + half > self.viewport_height as f64 - gap
        } else {
            y - half < gap
        }
    }

    pub fn paint<C: Canvas>(&self, canvas: &mut C, frames: &[Texture]) -> Result<(), RenderError> {
        let state = self.read();
        if frames.is_empty() {
            return Ok(());
        }

        let frame = &frames[(state.time / self.frame_ticks) as usize % frames.len()];
        let top = (self.viewport_height as f64 - state.y - self.height as f64 / 2.0).round() as i32;
        canvas.draw_texture(frame, ScreenRect::new(self.x, top, self.width, self.height), Flip::None)
    }
}
