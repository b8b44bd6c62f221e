use std::{
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::bird::Bird;
use crate::{
    config::GameConfig,
    error::RenderError,
    render::{Canvas, Flip, ScreenRect, Texture},
};

/// A single obstacle. `gap` is the height of the solid body measured from the
/// edge it is mounted on: the ground for a normal pipe, the top of the
/// viewport for an inverted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipe {
    x: i32,
    gap: i32,
    width: i32,
    inverted: bool,
}

impl Pipe {
    pub fn new(x: i32, gap: i32, width: i32, inverted: bool) -> Self {
        Self { x, gap, width, inverted }
    }

    /// A pipe entering at the right edge of the viewport.
    pub fn random<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let gap = if config.pipe_gap_min < config.pipe_gap_max {
            rng.gen_range(config.pipe_gap_min..config.pipe_gap_max)
        } else {
            config.pipe_gap_min
        };
        Self::new(config.viewport_width, gap, config.pipe_width, rng.gen_bool(0.5))
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn gap(&self) -> i32 {
        self.gap
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn visible(&self) -> bool {
        self.x + self.width > 0
    }

    fn paint<C: Canvas>(&self, canvas: &mut C, texture: &Texture, viewport_height: i32) -> Result<(), RenderError> {
        if self.inverted {
            canvas.draw_texture(texture, ScreenRect::new(self.x, 0, self.width, self.gap), Flip::Vertical)
        } else {
            let dest = ScreenRect::new(self.x, viewport_height - self.gap, self.width, self.gap);
            canvas.draw_texture(texture, dest, Flip::None)
        }
    }
}

/// The live obstacles, in spawn order. Shared between the tick loop and the
/// spawn task; every access goes through one read-mostly lock.
#[derive(Debug)]
pub struct Pipes {
    pipes: RwLock<Vec<Pipe>>,
    config: GameConfig,
}

impl Pipes {
    pub fn new(config: &GameConfig) -> Self {
        Self { pipes: RwLock::new(Vec::new()), config: config.clone() }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Pipe>> {
        self.pipes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Pipe>> {
        self.pipes.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Pipe> {
        self.read().clone()
    }

    pub fn insert(&self, pipe: Pipe) {
        self.write().push(pipe);
    }

    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) {
        let pipe = Pipe::random(&self.config, rng);
        trace!(gap = pipe.gap, inverted = pipe.inverted, "spawned pipe");
        self.insert(pipe);
    }

    /// Scroll every pipe left, then drop the ones that left the viewport.
    pub fn update(&self) {
        let speed = self.config.pipe_speed;
        let mut pipes = self.write();
        for pipe in pipes.iter_mut() {
            pipe.x -= speed;
        }
        pipes.retain(Pipe::visible);
    }

    /// Test the bird against every pipe; no early exit.
    pub fn touch(&self, bird: &Bird) {
        for pipe in self.read().iter() {
            bird.touch(pipe);
        }
    }

    pub fn restart(&self) {
        self.write().clear();
    }

    pub fn paint<C: Canvas>(&self, canvas: &mut C, texture: &Texture) -> Result<(), RenderError> {
        for pipe in self.read().iter() {
            pipe.paint(canvas, texture, self.config.viewport_height)?;
        }
        Ok(())
    }

    /// Spawn a pipe every `period`, starting immediately, until `cancellation_token` fires.
    pub fn spawn_producer(self: &Arc<Self>, period: Duration, cancellation_token: CancellationToken) -> JoinHandle<()> {
        let pipes = Arc::clone(self);
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancellation_token.cancelled() => break,
                    _ = interval.tick() => pipes.spawn(&mut rng),
                }
            }
            debug!("pipe producer stopped");
        })
    }
}
