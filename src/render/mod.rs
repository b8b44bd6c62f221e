mod terminal;
mod texture;

pub use terminal::TerminalCanvas;
pub use texture::{Font, Texture};

use crate::error::RenderError;

/// Rectangle in world units, screen oriented: `y` grows downward from the top of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flip {
    #[default]
    None,
    Vertical,
}

/// Drawing surface the scene paints onto.
pub trait Canvas {
    fn clear(&mut self) -> Result<(), RenderError>;

    fn draw_texture(&mut self, texture: &Texture, dest: ScreenRect, flip: Flip) -> Result<(), RenderError>;

    fn present(&mut self) -> Result<(), RenderError>;
}
