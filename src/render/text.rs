use crate::foundation::error::{BeatframeError, BeatframeResult};
use anyhow::Context;
use std::borrow::Cow;
use std::path::Path;

/// Brush carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

struct RegisteredFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Font registry and layout contexts for the text overlay.
///
/// Only fonts registered from bytes are used; there is no system font lookup. Families are
/// matched case-insensitively and the first registered font is the fallback.
pub struct FontBook {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    fonts: Vec<RegisteredFont>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.families())
            .finish_non_exhaustive()
    }
}

/// One laid-out line ready to draw.
pub(crate) struct TextLine {
    pub(crate) layout: parley::Layout<TextBrush>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl TextLine {
    pub(crate) fn width(&self) -> f32 {
        self.layout.width()
    }

    pub(crate) fn height(&self) -> f32 {
        self.layout.height()
    }
}

impl FontBook {
    /// Empty book.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: Vec::new(),
        }
    }

    /// Register a TrueType/OpenType font. Returns its family name.
    pub fn register(&mut self, bytes: Vec<u8>) -> BeatframeResult<String> {
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.clone()), 0);
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            BeatframeError::validation("no font families registered from font bytes")
        })?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| BeatframeError::validation("registered font family has no name"))?
            .to_string();

        tracing::debug!(family = %family, "registered font");
        self.fonts.push(RegisteredFont {
            family: family.clone(),
            data,
        });
        Ok(family)
    }

    /// Read and register a font file.
    pub fn register_file(&mut self, path: &Path) -> BeatframeResult<String> {
        let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        self.register(bytes)
    }

    /// Registered family names in registration order.
    pub fn families(&self) -> Vec<&str> {
        self.fonts.iter().map(|f| f.family.as_str()).collect()
    }

    /// Whether any font is registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    fn resolve(&self, family: &str) -> Option<&RegisteredFont> {
        self.fonts
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(family.trim()))
            .or_else(|| self.fonts.first())
    }

    /// Shape one line. `None` when the text is empty or no font can be resolved.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        letter_spacing_px: f32,
        brush: TextBrush,
    ) -> Option<TextLine> {
        if text.trim().is_empty() || !size_px.is_finite() || size_px <= 0.0 {
            return None;
        }
        let (family_name, font) = {
            let f = self.resolve(family)?;
            (f.family.clone(), f.data.clone())
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            if letter_spacing_px.is_finite() {
                letter_spacing_px
            } else {
                0.0
            },
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Some(TextLine { layout, font })
    }
}

/// Fill the glyphs of `line` with its brush colors at the current transform.
pub(crate) fn draw_line(ctx: &mut vello_cpu::RenderContext, line: &TextLine, override_color: Option<TextBrush>) {
    for layout_line in line.layout.lines() {
        for item in layout_line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = override_color.unwrap_or(run.style().brush);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&line.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
