use anyhow::{Context, Result};
use rusttype::{Font, Scale};
use std::path::Path;

pub(crate) struct FontConfig {
    pub font: Font<'static>,
    pub scale: Scale,
}

pub(crate) struct Fonts {
    pub title: FontConfig,
    pub regular: FontConfig,
    pub small: FontConfig,
}

/// Load a TrueType font once; all three sizes share the same face.
pub(crate) fn load(path: &Path) -> Result<Fonts> {
    let data = std::fs::read(path).context(format!("Failed to read font {}", path.display()))?;
    let font = Font::try_from_vec(data)
        .context(format!("{} is not a usable TrueType font", path.display()))?;

    Ok(Fonts {
        title: font_config(font.clone(), 24.0),
        regular: font_config(font.clone(), 18.0),
        small: font_config(font, 14.0),
    })
}

fn font_config(font: Font<'static>, scale: f32) -> FontConfig {
    FontConfig {
        font,
        scale: Scale::uniform(scale),
    }
}
