use std::time::Instant;

use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{
    action::Action,
    config::Config,
    error::RenderError,
    render::TerminalCanvas,
    scene::{Assets, Scene},
    tui,
};

pub struct App {
    config: Config,
    scene: Scene,
}

impl App {
    /// Load configuration and every asset. Nothing touches the terminal yet, so
    /// a failure here is reported on the normal screen.
    pub fn new() -> Result<Self> {
        let config = Config::new()?;
        let assets = Assets::load(&config.assets, &config.styles)?;
        let scene = Scene::new(&config.game, assets, Instant::now());
        Ok(Self { config, scene })
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let mut tui = tui::Tui::new()?;
        tui.tick_rate(self.config.game.tick_rate);
        tui.mouse(true);
        tui.enter()?;

        let producer_token = CancellationToken::new();
        let producer = self.scene.pipes().spawn_producer(self.config.game.spawn_interval(), producer_token.clone());
        info!(tick_rate = self.config.game.tick_rate, "game loop started");

        let result = self.event_loop(&mut tui, &action_tx, &mut action_rx).await;

        producer_token.cancel();
        producer.await?;
        tui.exit()?;
        result
    }

    async fn event_loop(
        &mut self,
        tui: &mut tui::Tui,
        action_tx: &UnboundedSender<Action>,
        action_rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        loop {
            let event = tui.next().await.unwrap_or(tui::Event::Closed);
            if let Some(action) = self.map_event(event) {
                action_tx.send(action)?;
            }

            while let Ok(action) = action_rx.try_recv() {
                if action != Action::Tick {
                    debug!("{action:?}");
                }
                match &action {
                    Action::Tick => {
                        self.scene.update(&action, Instant::now());
                        self.render(tui)?;
                    },
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, *w, *h))?;
                        self.render(tui)?;
                    },
                    Action::Error(msg) => return Err(eyre!("{msg}")),
                    Action::Quit | Action::Jump => self.scene.update(&action, Instant::now()),
                }
            }

            if self.scene.should_quit() {
                info!("quitting");
                return Ok(());
            }
        }
    }

    fn map_event(&self, event: tui::Event) -> Option<Action> {
        match event {
            tui::Event::Tick => Some(Action::Tick),
            tui::Event::Resize(w, h) => Some(Action::Resize(w, h)),
            tui::Event::Closed => Some(Action::Quit),
            tui::Event::Error => Some(Action::Error("Failed to read terminal input".to_string())),
            tui::Event::Key(key) => self.map_key(key),
            tui::Event::Mouse(mouse) => map_mouse(mouse),
            other => {
                trace!(event = ?other, "ignored event");
                None
            },
        }
    }

    fn map_key(&self, key: KeyEvent) -> Option<Action> {
        let action = self.config.keybindings.get(&key).cloned();
        if action.is_none() {
            trace!(key = ?key, "unbound key");
        }
        action
    }

    fn render(&self, tui: &mut tui::Tui) -> Result<()> {
        let game = &self.config.game;
        let mut painted = Ok(());
        tui.draw(|f| {
            let area = f.area();
            let mut canvas = TerminalCanvas::new(f.buffer_mut(), area, game.viewport_width, game.viewport_height);
            painted = self.scene.paint(&mut canvas);
        })
        .map_err(RenderError::from)?;
        painted?;
        Ok(())
    }
}

/// Any pointer button going down flaps.
fn map_mouse(mouse: MouseEvent) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::Down(_) => Some(Action::Jump),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers, MouseButton};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::GameConfig, scene::testing};

    fn app() -> App {
        let mut config = Config::default();
        config.keybindings.insert(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE), Action::Jump);
        let scene = Scene::new(&GameConfig::default(), testing::assets(), Instant::now());
        App { config, scene }
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent { kind, column: 3, row: 4, modifiers: KeyModifiers::empty() }
    }

    #[test]
    fn test_pointer_down_jumps() {
        assert_eq!(map_mouse(mouse(MouseEventKind::Down(MouseButton::Left))), Some(Action::Jump));
        assert_eq!(map_mouse(mouse(MouseEventKind::Down(MouseButton::Right))), Some(Action::Jump));
        assert_eq!(map_mouse(mouse(MouseEventKind::Up(MouseButton::Left))), None);
        assert_eq!(map_mouse(mouse(MouseEventKind::Moved)), None);
    }

    #[test]
    fn test_event_mapping() {
        let app = app();
        assert_eq!(app.map_event(tui::Event::Tick), Some(Action::Tick));
        assert_eq!(app.map_event(tui::Event::Resize(80, 24)), Some(Action::Resize(80, 24)));
        assert_eq!(app.map_event(tui::Event::Closed), Some(Action::Quit));
        assert_eq!(
            app.map_event(tui::Event::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE))),
            Some(Action::Jump)
        );
        assert_eq!(app.map_event(tui::Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE))), None);
        assert_eq!(app.map_event(tui::Event::FocusLost), None);
        assert_eq!(app.map_event(tui::Event::Paste("hi".to_string())), None);
    }
}
