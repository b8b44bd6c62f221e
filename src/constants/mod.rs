pub mod game;

pub const TITLE_TEXT: &str = "FLAPPY BIRD";
pub const GAME_OVER_TEXT: &str = "GAME OVER";
