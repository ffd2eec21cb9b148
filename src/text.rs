//! Glyph layout and rasterization for text mobjects.
//!
//! Text is laid out in em units, where one em is the height of a line. The
//! scene converts em to scene units, and the renderer converts em to pixels.

use rusttype::{point, Font, Scale};
use unicode_segmentation::UnicodeSegmentation;

/// Font size that maps to `LINE_HEIGHT_UNITS` at scale 1.0
pub const BASE_FONT_SIZE: f32 = 48.0;

/// Height of a line of `BASE_FONT_SIZE` text in scene units
pub const LINE_HEIGHT_UNITS: f32 = 0.5;

const BLOCK_ADVANCE_EM: f32 = 0.6;
const BLOCK_WIDTH_EM: f32 = 0.55;
const BLOCK_TOP_EM: f32 = 0.15;
const BLOCK_HEIGHT_EM: f32 = 0.7;

/// A visible grapheme placed on a text line
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphCell {
    pub grapheme: String,
    pub x_em: f32,
    pub advance_em: f32,
}

/// Result of laying out one line of text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphLayout {
    pub glyphs: Vec<GlyphCell>,
    pub width_em: f32,
}

impl GlyphLayout {
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Measures and draws glyphs, either from a loaded font or as solid cells
#[derive(Clone, Default)]
pub enum GlyphRasterizer {
    #[default]
    Blocks,
    Font(Box<Font<'static>>),
}

impl std::fmt::Debug for GlyphRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlyphRasterizer::Blocks => write!(f, "GlyphRasterizer::Blocks"),
            GlyphRasterizer::Font(_) => write!(f, "GlyphRasterizer::Font"),
        }
    }
}

impl GlyphRasterizer {
    /// Parse font bytes; `None` if the data is not a usable font
    pub fn from_font_bytes(data: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(data).map(|font| GlyphRasterizer::Font(Box::new(font)))
    }

    fn advance_em(&self, grapheme: &str) -> f32 {
        match self {
            GlyphRasterizer::Blocks => BLOCK_ADVANCE_EM,
            GlyphRasterizer::Font(font) => grapheme
                .chars()
                .next()
                .map(|c| font.glyph(c).scaled(Scale::uniform(1.0)).h_metrics().advance_width)
                .unwrap_or(0.0),
        }
    }

    /// Lay out a single line. Whitespace advances the pen but gets no cell.
    pub fn layout(&self, content: &str) -> GlyphLayout {
        let mut glyphs = Vec::new();
        let mut pen = 0.0;

        for grapheme in content.graphemes(true) {
            let advance = self.advance_em(grapheme);
            if !grapheme.chars().all(char::is_whitespace) {
                glyphs.push(GlyphCell {
                    grapheme: grapheme.to_string(),
                    x_em: pen,
                    advance_em: advance,
                });
            }
            pen += advance;
        }

        GlyphLayout {
            glyphs,
            width_em: pen,
        }
    }

    /// Rasterize `cell` for a line whose top-left corner is `origin` (pixels)
    /// with one em spanning `em_px` pixels. `plot` receives pixel coordinates
    /// and coverage in `0.0..=1.0`.
    pub fn draw_glyph<F>(&self, cell: &GlyphCell, origin: (f32, f32), em_px: f32, mut plot: F)
    where
        F: FnMut(i32, i32, f32),
    {
        match self {
            GlyphRasterizer::Blocks => {
                let x0 = (origin.0 + cell.x_em * em_px).round() as i32;
                let y0 = (origin.1 + BLOCK_TOP_EM * em_px).round() as i32;
                let w = (BLOCK_WIDTH_EM * em_px).round().max(1.0) as i32;
                let h = (BLOCK_HEIGHT_EM * em_px).round().max(1.0) as i32;
                for dy in 0..h {
                    for dx in 0..w {
                        plot(x0 + dx, y0 + dy, 1.0);
                    }
                }
            }
            GlyphRasterizer::Font(font) => {
                let Some(ch) = cell.grapheme.chars().next() else {
                    return;
                };
                let scale = Scale::uniform(em_px);
                let ascent = font.v_metrics(scale).ascent;
                let glyph = font
                    .glyph(ch)
                    .scaled(scale)
                    .positioned(point(origin.0 + cell.x_em * em_px, origin.1 + ascent));
                if let Some(bb) = glyph.pixel_bounding_box() {
                    glyph.draw(|gx, gy, v| plot(bb.min.x + gx as i32, bb.min.y + gy as i32, v));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout_skips_spaces() {
        let layout = GlyphRasterizer::Blocks.layout("AI Fin");
        assert_eq!(layout.len(), 5);
        assert!((layout.width_em - 6.0 * BLOCK_ADVANCE_EM).abs() < 1e-5);
        // pen advanced past the space
        assert!((layout.glyphs[2].x_em - 3.0 * BLOCK_ADVANCE_EM).abs() < 1e-5);
    }

    #[test]
    fn test_layout_counts_graphemes() {
        // "e" + combining acute is a single grapheme
        let layout = GlyphRasterizer::Blocks.layout("e\u{301}x");
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn test_empty_layout() {
        let layout = GlyphRasterizer::Blocks.layout("");
        assert!(layout.is_empty());
        assert_eq!(layout.width_em, 0.0);
    }

    #[test]
    fn test_block_draw_coverage() {
        let layout = GlyphRasterizer::Blocks.layout("A");
        let mut hits = 0;
        GlyphRasterizer::Blocks.draw_glyph(&layout.glyphs[0], (0.0, 0.0), 20.0, |_, _, v| {
            assert_eq!(v, 1.0);
            hits += 1;
        });
        assert_eq!(hits, 11 * 14);
    }

    #[test]
    fn test_invalid_font_bytes() {
        assert!(GlyphRasterizer::from_font_bytes(b"not a font".to_vec()).is_none());
    }
}
