//! Bitmap font scaling
//!
//! Fonts are JSON documents with a line height and a map of glyphs, each glyph
//! a grid of pixel values plus a baseline offset. Scaling by `n` turns every
//! pixel into an `n`×`n` block and multiplies the vertical metrics by `n`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from reading, scaling, or writing a font
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Failed to access font file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid font JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scale must be at least 1, got {0}")]
    InvalidScale(u32),
}

/// A bitmap font document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitmapFont {
    pub name: String,
    #[serde(rename = "lineHeight")]
    pub line_height: i64,
    #[serde(default)]
    pub description: String,
    pub glyphs: BTreeMap<String, Glyph>,
    /// Keys this tool does not interpret, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One character's bitmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub offset: i64,
    pub pixels: Vec<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Glyph {
    /// Repeats each pixel `scale` times across and each row `scale` times down
    pub fn scaled(&self, scale: u32) -> Glyph {
        let n = scale as usize;
        let pixels = self
            .pixels
            .iter()
            .flat_map(|row| {
                let wide: Vec<Value> = row
                    .iter()
                    .flat_map(|pixel| std::iter::repeat(pixel.clone()).take(n))
                    .collect();
                std::iter::repeat(wide).take(n)
            })
            .collect();

        Glyph {
            offset: self.offset * i64::from(scale),
            pixels,
            extra: self.extra.clone(),
        }
    }
}

impl BitmapFont {
    /// Returns a copy scaled by `scale`, renamed to `name`
    pub fn scaled(&self, scale: u32, name: &str, base_name: &str) -> Result<BitmapFont, FontError> {
        if scale == 0 {
            return Err(FontError::InvalidScale(scale));
        }
        Ok(BitmapFont {
            name: name.to_string(),
            line_height: self.line_height * i64::from(scale),
            description: format!("{} scaled to {}", base_name, scale),
            glyphs: self
                .glyphs
                .iter()
                .map(|(ch, glyph)| (ch.clone(), glyph.scaled(scale)))
                .collect(),
            extra: self.extra.clone(),
        })
    }
}

/// File name without directory or extension
fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads the font at `base`, scales it by `scale`, and writes it to `scaled`.
///
/// The output is named after `scaled`'s file stem and its description records
/// the base font and scale.
pub fn scale_font(base: &Path, scaled: &Path, scale: u32) -> Result<(), FontError> {
    if scale == 0 {
        return Err(FontError::InvalidScale(scale));
    }

    let text = fs::read_to_string(base).map_err(|source| FontError::Io {
        path: base.display().to_string(),
        source,
    })?;
    let font: BitmapFont = serde_json::from_str(&text)?;

    let output = font.scaled(scale, &stem(scaled), &stem(base))?;
    let json = serde_json::to_string_pretty(&output)?;

    fs::write(scaled, json).map_err(|source| FontError::Io {
        path: scaled.display().to_string(),
        source,
    })?;

    tracing::info!(
        base = %base.display(),
        scaled = %scaled.display(),
        scale,
        glyphs = output.glyphs.len(),
        "Scaled font"
    );
    Ok(())
}
