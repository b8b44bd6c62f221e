use std::{io, path::PathBuf};

use thiserror::Error;

use crate::render::ScreenRect;

/// Failure to bring an asset into memory. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} has nothing to draw", path.display())]
    Empty { path: PathBuf },
    #[error("malformed font {} at line {line}: {reason}", path.display())]
    Font { path: PathBuf, line: usize, reason: String },
    #[error("no bird animation frames configured")]
    NoFrames,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),
    #[error("cannot draw into {0:?}")]
    InvalidDestination(ScreenRect),
    #[error("terminal output failed: {0}")]
    Terminal(#[from] io::Error),
}
