use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{KinetypeError, KinetypeResult};

/// One glyph id at an element-local position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlacedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// Glyphs for one character, positioned so the layout box is centered on the origin.
#[derive(Clone, Debug)]
pub(crate) struct ShapedChar {
    /// Glyphs in element-local coordinates.
    pub(crate) glyphs: Vec<PlacedGlyph>,
    /// Font size the glyphs were shaped at.
    pub(crate) font_size: f32,
}

/// Stateful helper that shapes single characters with Parley from raw font bytes.
///
/// Shaped characters are cached by `(char, size)`; one text uses a handful of distinct glyphs
/// redrawn every frame.
pub(crate) struct GlyphShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    cache: HashMap<(char, u32), Arc<ShapedChar>>,
}

impl GlyphShaper {
    /// Register `font_bytes` and prepare a shaper for its first family.
    pub(crate) fn new(font_bytes: Vec<u8>) -> KinetypeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            KinetypeError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| KinetypeError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
            cache: HashMap::new(),
        })
    }

    /// Font handle for glyph runs.
    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `ch` at `size_px`.
    pub(crate) fn shape(&mut self, ch: char, size_px: f32) -> KinetypeResult<Arc<ShapedChar>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(KinetypeError::validation(
                "glyph size must be finite and > 0",
            ));
        }
        let key = (ch, size_px.to_bits());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let mut buf = [0u8; 4];
        let text: &str = ch.encode_utf8(&mut buf);
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let (w, h) = (layout.width(), layout.height());
        let mut glyphs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.glyphs().map(|g| PlacedGlyph {
                    id: g.id,
                    x: g.x - w / 2.0,
                    y: g.y - h / 2.0,
                }));
            }
        }

        let shaped = Arc::new(ShapedChar {
            glyphs,
            font_size: size_px,
        });
        self.cache.insert(key, Arc::clone(&shaped));
        Ok(shaped)
    }
}

impl std::fmt::Debug for GlyphShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphShaper")
            .field("family_name", &self.family_name)
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/shaper.rs"]
mod tests;
