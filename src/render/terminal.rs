use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Clear, Widget},
};

use super::{Canvas, Flip, ScreenRect, Texture};
use crate::error::RenderError;

/// Canvas over a ratatui buffer. The world viewport is stretched over `area`
/// and every terminal cell takes the nearest texel of whatever covers it.
pub struct TerminalCanvas<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    viewport: (i32, i32),
}

impl<'a> TerminalCanvas<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect, viewport_width: i32, viewport_height: i32) -> Self {
        Self { buf, area, viewport: (viewport_width.max(1), viewport_height.max(1)) }
    }

    /// World span `[start, start + len)` to a half-open cell span relative to the area.
    fn to_cells(start: i32, len: i32, world: i32, cells: u16) -> (i64, i64) {
        let cells = cells as i64;
        let world = world as i64;
        let begin = (start as i64 * cells).div_euclid(world);
        let end = ((start as i64 + len as i64) * cells).div_euclid(world);
        (begin, end.max(begin + 1))
    }
}

impl Canvas for TerminalCanvas<'_> {
    fn clear(&mut self) -> Result<(), RenderError> {
        Clear.render(self.area, self.buf);
        Ok(())
    }

    fn draw_texture(&mut self, texture: &Texture, dest: ScreenRect, flip: Flip) -> Result<(), RenderError> {
        if dest.w <= 0 || dest.h <= 0 {
            return Err(RenderError::InvalidDestination(dest));
        }

        let (x0, x1) = Self::to_cells(dest.x, dest.w, self.viewport.0, self.area.width);
        let (y0, y1) = Self::to_cells(dest.y, dest.h, self.viewport.1, self.area.height);
        let (tex_w, tex_h) = (texture.width() as i64, texture.height() as i64);
        let style = texture.style();

        for cy in y0.max(0)..y1.min(self.area.height as i64) {
            let mut ty = (cy - y0) * tex_h / (y1 - y0);
            if flip == Flip::Vertical {
                ty = tex_h - 1 - ty;
            }
            for cx in x0.max(0)..x1.min(self.area.width as i64) {
                let tx = (cx - x0) * tex_w / (x1 - x0);
                let Some(ch) = texture.texel(tx as usize, ty as usize) else {
                    continue;
                };
                let position = (self.area.x + cx as u16, self.area.y + cy as u16);
                if let Some(cell) = self.buf.cell_mut(position) {
                    cell.set_char(ch).set_style(style);
                }
            }
        }

        Ok(())
    }

    /// The terminal flushes the buffer once the draw closure returns.
    fn present(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::style::{Color, Style};

    use super::*;

    fn symbols(buf: &Buffer) -> Vec<String> {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| (area.left()..area.right()).map(|x| buf[(x, y)].symbol().to_string()).collect())
            .collect()
    }

    fn texture() -> Texture {
        Texture::from_text("ab\ncd", Style::default().fg(Color::Green)).unwrap()
    }

    #[test]
    fn test_stretch_over_viewport() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 2));
        let mut canvas = TerminalCanvas::new(&mut buf, Rect::new(0, 0, 4, 2), 80, 40);
        canvas.draw_texture(&texture(), ScreenRect::new(0, 0, 80, 40), Flip::None).unwrap();

        assert_eq!(symbols(&buf), vec!["aabb", "ccdd"]);
        assert_eq!(buf[(0, 0)].fg, Color::Green);
    }

    #[test]
    fn test_vertical_flip() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 2));
        let mut canvas = TerminalCanvas::new(&mut buf, Rect::new(0, 0, 2, 2), 20, 20);
        canvas.draw_texture(&texture(), ScreenRect::new(0, 0, 20, 20), Flip::Vertical).unwrap();

        assert_eq!(symbols(&buf), vec!["cd", "ab"]);
    }

    #[test]
    fn test_clipping_and_transparency() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        let mut canvas = TerminalCanvas::new(&mut buf, Rect::new(0, 0, 4, 1), 40, 10);
        let sprite = Texture::from_text("x y", Style::default()).unwrap();
        // Starts half a texture left of the viewport.
        canvas.draw_texture(&sprite, ScreenRect::new(-10, 0, 30, 10), Flip::None).unwrap();

        assert_eq!(symbols(&buf), vec![" y  "]);
    }

    #[test]
    fn test_offset_area() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 3));
        let area = Rect::new(1, 1, 2, 2);
        let mut canvas = TerminalCanvas::new(&mut buf, area, 20, 20);
        canvas.draw_texture(&texture(), ScreenRect::new(10, 10, 10, 10), Flip::None).unwrap();

        assert_eq!(symbols(&buf), vec!["    ", "    ", "  a "]);
    }

    #[test]
    fn test_invalid_destination() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 2));
        let mut canvas = TerminalCanvas::new(&mut buf, Rect::new(0, 0, 2, 2), 20, 20);
        let dest = ScreenRect::new(0, 0, 0, 5);
        assert!(matches!(
            canvas.draw_texture(&texture(), dest, Flip::None),
            Err(RenderError::InvalidDestination(d)) if d == dest
        ));
    }
}
