use crate::animation::LeafState;
use crate::layout::Point;
use crate::renderer::FrameBuffer;
use crate::script::{Mobject, MobjectKind, RectangleSpec, TextMobject};
use crate::text::GlyphRasterizer;

/// Height of the visible frame in scene units
pub const FRAME_HEIGHT_UNITS: f32 = 8.0;

/// Maps scene units onto the pixel grid of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixels_per_unit: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels_per_unit: height as f32 / FRAME_HEIGHT_UNITS,
        }
    }

    pub fn to_pixel(&self, point: Point) -> (f32, f32) {
        (
            self.width as f32 / 2.0 + point.x * self.pixels_per_unit,
            self.height as f32 / 2.0 - point.y * self.pixels_per_unit,
        )
    }
}

/// Draws mobjects into a frame buffer
pub struct Compositor;

impl Compositor {
    /// Blend a rectangle covering pixel centers in `[x0, x1) x [y0, y1)`
    pub fn fill_rect(
        buffer: &mut FrameBuffer,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        color: [u8; 4],
    ) {
        if color[3] == 0 || x1 <= x0 || y1 <= y0 {
            return;
        }
        let (buf_width, buf_height) = buffer.dimensions();
        let first_col = (x0 - 0.5).ceil().max(0.0) as i64;
        let last_col = ((x1 - 0.5).ceil() as i64).min(buf_width as i64);
        let first_row = (y0 - 0.5).ceil().max(0.0) as i64;
        let last_row = ((y1 - 0.5).ceil() as i64).min(buf_height as i64);

        for py in first_row..last_row {
            for px in first_col..last_col {
                buffer.blend_pixel(px as u32, py as u32, color);
            }
        }
    }

    /// Center and scale of a leaf after applying its animated state
    fn placed(center: Point, state: &LeafState) -> (Point, f32) {
        let moved = center + state.offset;
        let scaled = state.anchor + (moved - state.anchor) * state.scale;
        (scaled, state.scale)
    }

    pub fn draw_rectangle(
        buffer: &mut FrameBuffer,
        viewport: &Viewport,
        rect: &RectangleSpec,
        center: Point,
        state: &LeafState,
    ) {
        let (center, scale) = Self::placed(center, state);
        if scale <= 0.0 {
            return;
        }
        let ppu = viewport.pixels_per_unit;
        let (cx, cy) = viewport.to_pixel(center);
        let half_w = rect.width * scale * ppu / 2.0;
        let half_h = rect.height * scale * ppu / 2.0;
        let (x0, y0, x1, y1) = (cx - half_w, cy - half_h, cx + half_w, cy + half_h);

        let fill = rect
            .fill_color
            .with_opacity(rect.fill_opacity * state.opacity);
        Self::fill_rect(buffer, x0, y0, x1, y1, fill);

        // Stroke straddles the outline
        let half_t = rect.stroke_units() * scale * ppu / 2.0;
        if half_t <= 0.0 {
            return;
        }
        let stroke = rect.stroke_color.with_opacity(state.opacity);
        Self::fill_rect(buffer, x0 - half_t, y0 - half_t, x1 + half_t, y0 + half_t, stroke);
        Self::fill_rect(buffer, x0 - half_t, y1 - half_t, x1 + half_t, y1 + half_t, stroke);
        Self::fill_rect(buffer, x0 - half_t, y0 + half_t, x0 + half_t, y1 - half_t, stroke);
        Self::fill_rect(buffer, x1 - half_t, y0 + half_t, x1 + half_t, y1 - half_t, stroke);
    }

    pub fn draw_text(
        buffer: &mut FrameBuffer,
        viewport: &Viewport,
        rasterizer: &GlyphRasterizer,
        text: &TextMobject,
        center: Point,
        state: &LeafState,
    ) {
        let (center, scale) = Self::placed(center, state);
        if scale <= 0.0 || state.opacity <= 0.0 {
            return;
        }
        let em_px = text.line_height * scale * viewport.pixels_per_unit;
        let top_left = Point::new(
            center.x - text.width() * scale / 2.0,
            center.y + text.line_height * scale / 2.0,
        );
        let origin = viewport.to_pixel(top_left);
        let count = text.layout.len();

        for (idx, cell) in text.layout.glyphs.iter().enumerate() {
            let alpha = state.opacity * state.glyph_reveal(idx, count);
            if alpha <= 0.0 {
                continue;
            }
            rasterizer.draw_glyph(cell, origin, em_px, |x, y, coverage| {
                buffer.blend_at(x, y, text.spec.color.with_opacity(alpha * coverage));
            });
        }
    }

    /// Draw one leaf if it is visible in `state`
    pub fn draw_mobject(
        buffer: &mut FrameBuffer,
        viewport: &Viewport,
        rasterizer: &GlyphRasterizer,
        mobject: &Mobject,
        state: &LeafState,
    ) {
        if !state.visible {
            return;
        }
        match &mobject.kind {
            MobjectKind::Rectangle(rect) => {
                Self::draw_rectangle(buffer, viewport, rect, mobject.center, state)
            }
            MobjectKind::Text(text) => {
                Self::draw_text(buffer, viewport, rasterizer, text, mobject.center, state)
            }
            MobjectKind::Group(_) => {}
        }
    }
}
