mod assets;
mod bird;
mod pipe;

use std::{sync::Arc, time::Instant};

pub use assets::Assets;
pub use bird::Bird;
pub use pipe::{Pipe, Pipes};
use tracing::{debug, info};

use crate::{
    action::Action,
    config::GameConfig,
    error::RenderError,
    render::{Canvas, Flip, ScreenRect, Texture},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Title { until: Instant },
    Playing,
    GameOver { until: Instant },
    Quit,
}

pub struct Scene {
    config: GameConfig,
    assets: Assets,
    bird: Bird,
    pipes: Arc<Pipes>,
    phase: Phase,
}

impl Scene {
    pub fn new(config: &GameConfig, assets: Assets, now: Instant) -> Self {
        Self {
            config: config.clone(),
            assets,
            bird: Bird::new(config),
            pipes: Arc::new(Pipes::new(config)),
            phase: Phase::Title { until: now + config.title_delay() },
        }
    }

    /// Handle shared with the spawn task.
    pub fn pipes(&self) -> &Arc<Pipes> {
        &self.pipes
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn should_quit(&self) -> bool {
        self.phase == Phase::Quit
    }

    pub fn update(&mut self, action: &Action, now: Instant) {
        match action {
            Action::Tick => self.tick(now),
            Action::Jump if self.phase != Phase::Quit => self.bird.jump(),
            Action::Quit => {
                debug!(phase = ?self.phase, "quit requested");
                self.phase = Phase::Quit;
            },
            _ => {},
        }
    }

    fn tick(&mut self, now: Instant) {
        match self.phase {
            Phase::Title { until } | Phase::GameOver { until } => {
                if now >= until {
                    self.restart();
                    self.phase = Phase::Playing;
                    info!("round started");
                }
            },
            Phase::Playing => {
                self.bird.update();
                self.pipes.update();
                self.pipes.touch(&self.bird);
                if self.bird.is_dead() {
                    info!(pipes = self.pipes.len(), "bird died");
                    self.phase = Phase::GameOver { until: now + self.config.game_over_delay() };
                }
            },
            Phase::Quit => {},
        }
    }

    /// Put the bird back at its spawn point and clear every pipe.
    pub fn restart(&mut self) {
        self.bird.restart();
        self.pipes.restart();
    }

    pub fn paint<C: Canvas>(&self, canvas: &mut C) -> Result<(), RenderError> {
        canvas.clear()?;
        canvas.draw_texture(&self.assets.background, self.config.viewport(), Flip::None)?;

        match self.phase {
            Phase::Title { .. } => self.paint_banner(canvas, &self.assets.title)?,
            phase => {
                self.pipes.paint(canvas, &self.assets.pipe)?;
                self.bird.paint(canvas, &self.assets.bird_frames)?;
                if let Phase::GameOver { .. } = phase {
                    self.paint_banner(canvas, &self.assets.game_over)?;
                }
            },
        }

        canvas.present()
    }

    fn paint_banner<C: Canvas>(&self, canvas: &mut C, text: &Texture) -> Result<(), RenderError> {
        let (w, h) = (self.config.viewport_width, self.config.viewport_height);
        let dest = ScreenRect::new(w / 10, (h - h / 4) / 2, w * 4 / 5, h / 4);
        canvas.draw_texture(text, dest, Flip::None)
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::{testing::*, *};

    fn scene() -> (Scene, Instant) {
        let start = Instant::now();
        (Scene::new(&GameConfig::default(), assets(), start), start)
    }

    fn playing_scene() -> (Scene, Instant) {
        let (mut scene, start) = scene();
        let now = start + Duration::from_secs(2);
        scene.update(&Action::Tick, now);
        assert_eq!(scene.phase(), Phase::Playing);
        (scene, now)
    }

    #[test]
    fn test_title_waits_before_playing() {
        let (mut scene, start) = scene();
        assert!(matches!(scene.phase(), Phase::Title { .. }));

        scene.pipes().insert(Pipe::new(800, 150, 50, false));
        scene.update(&Action::Tick, start + Duration::from_millis(1_990));
        assert!(matches!(scene.phase(), Phase::Title { .. }));
        assert_eq!(scene.bird.position(), 300.0);

        scene.update(&Action::Tick, start + Duration::from_secs(2));
        assert_eq!(scene.phase(), Phase::Playing);
        assert!(scene.pipes().is_empty());
    }

    #[test]
    fn test_tick_moves_pipes_before_touch() {
        let (mut scene, now) = playing_scene();
        // One scroll step brings the pipe's left edge onto the bird's right edge.
        scene.pipes().insert(Pipe::new(62, 399, 50, false));

        scene.update(&Action::Tick, now);

        assert_eq!(scene.pipes().snapshot(), vec![Pipe::new(60, 399, 50, false)]);
        assert!(scene.bird.is_dead());
        assert_eq!(scene.phase(), Phase::GameOver { until: now + Duration::from_secs(1) });
    }

    #[test]
    fn test_jump_applies_between_ticks() {
        let (mut scene, now) = playing_scene();
        scene.update(&Action::Tick, now);
        scene.update(&Action::Jump, now);
        assert_eq!(scene.bird.velocity(), -5.0);

        let before = scene.bird.position();
        scene.update(&Action::Tick, now);
        assert_eq!(scene.bird.position(), before + 5.0);
    }

    #[test]
    fn test_game_over_pauses_then_restarts() {
        let (mut scene, now) = playing_scene();
        scene.pipes().insert(Pipe::new(40, 399, 50, false));
        scene.update(&Action::Tick, now);
        assert!(matches!(scene.phase(), Phase::GameOver { .. }));

        // The spawn task keeps producing while the tick path is paused.
        scene.pipes().insert(Pipe::new(800, 150, 50, true));
        let frozen = scene.bird.position();
        scene.update(&Action::Tick, now + Duration::from_millis(500));
        assert_eq!(scene.pipes().len(), 2);
        assert_eq!(scene.pipes().snapshot()[1].x(), 800);
        assert_eq!(scene.bird.position(), frozen);
        assert!(matches!(scene.phase(), Phase::GameOver { .. }));

        scene.update(&Action::Tick, now + Duration::from_secs(1));
        assert_eq!(scene.phase(), Phase::Playing);
        assert!(scene.pipes().is_empty());
        assert!(!scene.bird.is_dead());
    }

    #[test]
    fn test_restart_from_dead_with_pipes() {
        let (mut scene, _) = playing_scene();
        for x in [100, 250, 400, 550, 700] {
            scene.pipes().insert(Pipe::new(x, 200, 50, x % 200 == 0));
        }
        while !scene.bird.is_dead() {
            scene.bird.update();
        }

        scene.restart();

        assert!(scene.pipes().is_empty());
        assert!(!scene.bird.is_dead());
        assert_eq!(scene.bird.position(), 300.0);
        assert_eq!(scene.bird.velocity(), 0.0);
    }

    #[test]
    fn test_quit_bypasses_game_over() {
        let (mut scene, now) = playing_scene();
        scene.pipes().insert(Pipe::new(40, 399, 50, false));
        scene.update(&Action::Tick, now);
        assert!(matches!(scene.phase(), Phase::GameOver { .. }));

        scene.update(&Action::Quit, now);
        assert!(scene.should_quit());

        scene.update(&Action::Tick, now + Duration::from_secs(5));
        scene.update(&Action::Jump, now + Duration::from_secs(5));
        assert_eq!(scene.phase(), Phase::Quit);
    }

    #[test]
    fn test_paint_layers() {
        let (mut scene, now) = playing_scene();
        let assets = assets();
        scene.pipes().insert(Pipe::new(400, 150, 50, false));

        let mut canvas = RecordingCanvas::default();
        scene.paint(&mut canvas).unwrap();
        let layers: Vec<&Texture> = canvas.draws.iter().map(|d| &d.texture).collect();
        assert_eq!(layers, vec![&assets.background, &assets.pipe, &assets.bird_frames[0]]);
        assert_eq!(canvas.draws[0].dest, ScreenRect::new(0, 0, 800, 600));
        assert_eq!((canvas.clears, canvas.presents), (1, 1));

        scene.pipes().insert(Pipe::new(40, 399, 50, false));
        scene.update(&Action::Tick, now);
        scene.paint(&mut canvas).unwrap();
        let last = canvas.draws.last().unwrap();
        assert_eq!(last.texture, assets.game_over);
        assert_eq!(last.dest, ScreenRect::new(80, 225, 640, 150));
    }

    /// Accepts `remaining` draws, then fails the way a rejected destination does.
    #[derive(Debug, Default)]
    struct FailingCanvas {
        remaining: usize,
        draws: usize,
        presents: usize,
    }

    impl Canvas for FailingCanvas {
        fn clear(&mut self) -> Result<(), RenderError> {
            Ok(())
        }

        fn draw_texture(&mut self, _texture: &Texture, dest: ScreenRect, _flip: Flip) -> Result<(), RenderError> {
            if self.remaining == 0 {
                return Err(RenderError::InvalidDestination(dest));
            }
            self.remaining -= 1;
            self.draws += 1;
            Ok(())
        }

        fn present(&mut self) -> Result<(), RenderError> {
            self.presents += 1;
            Ok(())
        }
    }

    #[test]
    fn test_paint_stops_at_draw_failure() {
        let (scene, _) = playing_scene();
        scene.pipes().insert(Pipe::new(400, 150, 50, false));

        // Background and pipe succeed, the bird fails.
        let mut canvas = FailingCanvas { remaining: 2, ..FailingCanvas::default() };
        let err = scene.paint(&mut canvas).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDestination(rect) if rect == ScreenRect::new(10, 279, 50, 43)));
        assert_eq!((canvas.draws, canvas.presents), (2, 0));

        let mut canvas = FailingCanvas::default();
        assert!(scene.paint(&mut canvas).is_err());
        assert_eq!((canvas.draws, canvas.presents), (0, 0));
    }

    #[test]
    fn test_paint_title() {
        let (scene, _) = scene();
        let assets = assets();
        scene.pipes().insert(Pipe::new(400, 150, 50, false));

        let mut canvas = RecordingCanvas::default();
        scene.paint(&mut canvas).unwrap();
        let layers: Vec<&Texture> = canvas.draws.iter().map(|d| &d.texture).collect();
        assert_eq!(layers, vec![&assets.background, &assets.title]);
    }
}
