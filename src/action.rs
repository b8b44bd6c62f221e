use serde::{Deserialize, Serialize};
use strum::Display;

/// Everything the game loop reacts to. Terminal events that map to none of
/// these are dropped before they reach the scene.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Action {
    Tick,
    Resize(u16, u16),
    Quit,
    Jump,
    Error(String),
}
