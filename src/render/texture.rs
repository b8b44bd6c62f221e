use std::{collections::HashMap, fs, path::Path};

use ratatui::style::Style;

use crate::error::{RenderError, ResourceLoadError};

/// ASCII-art image. Blank cells are transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    rows: Vec<Vec<char>>,
    width: usize,
    style: Style,
}

impl Texture {
    /// Build a texture from multi-line text, padding rows to a common width.
    /// Leading and trailing empty lines are dropped. `None` if nothing is left.
    pub fn from_text(text: &str, style: Style) -> Option<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let first = lines.iter().position(|line| !line.trim().is_empty())?;
        let last = lines.iter().rposition(|line| !line.trim().is_empty())?;

        let rows: Vec<Vec<char>> = lines[first..=last].iter().map(|line| line.trim_end().chars().collect()).collect();
        Some(Self::from_rows(rows, style))
    }

    fn from_rows(mut rows: Vec<Vec<char>>, style: Style) -> Self {
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(width, ' ');
        }
        Self { rows, width, style }
    }

    pub fn load(path: &Path, style: Style) -> Result<Self, ResourceLoadError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ResourceLoadError::Read { path: path.to_path_buf(), source })?;
        Self::from_text(&text, style).ok_or_else(|| ResourceLoadError::Empty { path: path.to_path_buf() })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Character at texel (`x`, `y`), `None` when transparent or out of range.
    pub fn texel(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y).and_then(|row| row.get(x)).copied().filter(|c| *c != ' ')
    }
}

const SOLID: char = '█';
const SPACE_WIDTH: usize = 3;

/// Block font. The file lists glyphs one after another: a line holding the
/// character itself, followed by `height` rows of `#` (ink) and `.` (blank).
/// Empty lines between glyphs are ignored. The first glyph sets `height`;
/// `#` and `.` are reserved for rows and cannot be defined as glyphs.
#[derive(Debug, Clone)]
pub struct Font {
    height: usize,
    glyphs: HashMap<char, Vec<Vec<char>>>,
}

impl Font {
    pub fn load(path: &Path) -> Result<Self, ResourceLoadError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ResourceLoadError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text).map_err(|(line, reason)| ResourceLoadError::Font { path: path.to_path_buf(), line, reason })
    }

    fn parse(text: &str) -> Result<Self, (usize, String)> {
        let mut glyphs = HashMap::new();
        let mut height = None;
        let mut lines = text.lines().enumerate().filter(|(_, line)| !line.trim().is_empty()).peekable();

        while let Some((number, header)) = lines.next() {
            let mut chars = header.trim().chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err((number + 1, format!("expected a single character, found {header:?}")));
            };
            if ch == '#' || ch == '.' {
                return Err((number + 1, format!("{ch:?} is reserved for glyph rows")));
            }

            let mut rows = Vec::new();
            while let Some((_, row)) = lines.peek() {
                if height == Some(rows.len()) || !row.chars().all(|c| c == '#' || c == '.') {
                    break;
                }
                rows.push(row.chars().map(|c| if c == '#' { SOLID } else { ' ' }).collect::<Vec<_>>());
                lines.next();
            }

            match height {
                None if rows.is_empty() => return Err((number + 1, format!("glyph {ch:?} has no rows"))),
                None => height = Some(rows.len()),
                Some(expected) if expected != rows.len() => {
                    return Err((number + 1, format!("glyph {ch:?} has {} rows, expected {expected}", rows.len())))
                },
                Some(_) => {},
            }
            glyphs.insert(ch, rows);
        }

        let height = height.ok_or((0, "font defines no glyphs".to_string()))?;
        Ok(Self { height, glyphs })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn glyph(&self, ch: char) -> Option<&Vec<Vec<char>>> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&ch.to_ascii_uppercase()))
    }

    /// Lay `text` out on one line, one blank column between glyphs.
    pub fn render_text(&self, text: &str, style: Style) -> Result<Texture, RenderError> {
        let mut rows = vec![Vec::new(); self.height];

        for (index, ch) in text.chars().enumerate() {
            if index > 0 {
                rows.iter_mut().for_each(|row| row.push(' '));
            }
            match self.glyph(ch) {
                Some(glyph) => {
                    for (row, glyph_row) in rows.iter_mut().zip(glyph) {
                        row.extend(glyph_row.iter().copied());
                    }
                },
                None if ch == ' ' => rows.iter_mut().for_each(|row| row.extend([' '; SPACE_WIDTH])),
                None => return Err(RenderError::MissingGlyph(ch)),
            }
        }

        Ok(Texture::from_rows(rows, style))
    }
}
