use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use crate::{
    config::{AssetConfig, Styles},
    constants::{GAME_OVER_TEXT, TITLE_TEXT},
    error::ResourceLoadError,
    render::{Font, Texture},
};

/// Everything the scene draws, loaded once before the loop starts.
#[derive(Debug, Clone)]
pub struct Assets {
    pub bird_frames: Vec<Texture>,
    pub pipe: Texture,
    pub background: Texture,
    pub title: Texture,
    pub game_over: Texture,
}

impl Assets {
    pub fn load(paths: &AssetConfig, styles: &Styles) -> Result<Self> {
        if paths.bird_frames.is_empty() {
            return Err(ResourceLoadError::NoFrames.into());
        }

        let bird_style = styles.style("bird");
        let bird_frames = paths
            .bird_frames
            .iter()
            .map(|path| Texture::load(path, bird_style))
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Could not load bird image")?;
        let pipe = Texture::load(&paths.pipe, styles.style("pipe")).wrap_err("Could not load pipe image")?;
        let background = Texture::load(&paths.background, styles.style("background"))
            .wrap_err("Could not load background image")?;

        let font = Font::load(&paths.font).wrap_err("Could not load font")?;
        let title = font.render_text(TITLE_TEXT, styles.style("title")).wrap_err("Could not render title")?;
        let game_over =
            font.render_text(GAME_OVER_TEXT, styles.style("game_over")).wrap_err("Could not render game over text")?;

        info!(frames = bird_frames.len(), font = %paths.font.display(), "assets loaded");
        Ok(Self { bird_frames, pipe, background, title, game_over })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_load_bundled_assets() {
        let assets = Assets::load(&AssetConfig::default(), &Styles::default()).unwrap();
        assert_eq!(assets.bird_frames.len(), 4);
        assert!(assets.title.width() > assets.game_over.width());
    }

    #[test]
    fn test_missing_asset_is_fatal() {
        let paths = AssetConfig { pipe: PathBuf::from("assets/img/missing.txt"), ..AssetConfig::default() };
        let err = Assets::load(&paths, &Styles::default()).unwrap_err();
        assert!(err.to_string().contains("pipe"));
        assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_no_frames() {
        let paths = AssetConfig { bird_frames: Vec::new(), ..AssetConfig::default() };
        let err = Assets::load(&paths, &Styles::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ResourceLoadError>(), Some(ResourceLoadError::NoFrames)));
    }
}
