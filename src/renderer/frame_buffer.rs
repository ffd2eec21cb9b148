use crate::palette::Color;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// On-disk format for rendered frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    #[default]
    Png,
    Ppm,
}

impl FrameFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FrameFormat::Png => "png",
            FrameFormat::Ppm => "ppm",
        }
    }
}

/// RGBA frame buffer for rendering
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // RGBA, 4 bytes per pixel
}

impl FrameBuffer {
    /// Create new frame buffer with given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * 4;
        Self {
            width,
            height,
            pixels: vec![0; size],
        }
    }

    /// Clear buffer with color
    pub fn clear(&mut self, color: Color) {
        let rgba = color.rgba();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Set pixel at position
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x < self.width && y < self.height {
            let idx = ((y * self.width + x) * 4) as usize;
            self.pixels[idx..idx + 4].copy_from_slice(&color);
        }
    }

    /// Get pixel at position
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            let idx = ((y * self.width + x) * 4) as usize;
            let mut pixel = [0u8; 4];
            pixel.copy_from_slice(&self.pixels[idx..idx + 4]);
            Some(pixel)
        } else {
            None
        }
    }

    /// Alpha blend a color onto the buffer at position
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if color[3] == 0 {
            return;
        }
        if let Some(bg) = self.get_pixel(x, y) {
            let alpha = color[3] as f32 / 255.0;
            let inv_alpha = 1.0 - alpha;

            let blended = [
                (color[0] as f32 * alpha + bg[0] as f32 * inv_alpha).round() as u8,
                (color[1] as f32 * alpha + bg[1] as f32 * inv_alpha).round() as u8,
                (color[2] as f32 * alpha + bg[2] as f32 * inv_alpha).round() as u8,
                255, // Output alpha is always opaque
            ];

            self.set_pixel(x, y, blended);
        }
    }

    /// Blend with signed coordinates, ignoring anything off the frame
    pub fn blend_at(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x >= 0 && y >= 0 {
            self.blend_pixel(x as u32, y as u32, color);
        }
    }

    /// Get buffer dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get raw pixel data
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Save as PPM (simple image format)
    pub fn save_ppm(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create frame file: {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);

        // PPM header
        writeln!(writer, "P6")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        // Write RGB data (skip alpha channel)
        for chunk in self.pixels.chunks_exact(4) {
            writer.write_all(&chunk[0..3])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Save as PNG
    pub fn save_png(&self, path: &Path) -> Result<()> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )
        .with_context(|| format!("Failed to write frame: {}", path.display()))
    }

    pub fn save(&self, path: &Path, format: FrameFormat) -> Result<()> {
        match format {
            FrameFormat::Png => self.save_png(path),
            FrameFormat::Ppm => self.save_ppm(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_frame_buffer_creation() {
        let fb = FrameBuffer::new(1920, 1080);
        assert_eq!(fb.dimensions(), (1920, 1080));
        assert_eq!(fb.pixels.len(), 1920 * 1080 * 4);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new(100, 100);
        fb.clear(Color::rgb(255, 0, 0));

        assert_eq!(fb.get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(fb.get_pixel(50, 50), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_set_get_pixel() {
        let mut fb = FrameBuffer::new(100, 100);
        fb.set_pixel(10, 20, [100, 150, 200, 255]);

        assert_eq!(fb.get_pixel(10, 20), Some([100, 150, 200, 255]));
        assert_eq!(fb.get_pixel(100, 100), None); // Out of bounds
    }

    #[test]
    fn test_alpha_blending() {
        let mut fb = FrameBuffer::new(100, 100);
        fb.clear(Color::WHITE);

        // Blend 50% transparent red
        fb.blend_pixel(50, 50, [255, 0, 0, 128]);

        let pixel = fb.get_pixel(50, 50).unwrap();
        assert_eq!(pixel[0], 255);
        assert!(pixel[1] > 120 && pixel[1] < 135);
        assert!(pixel[2] > 120 && pixel[2] < 135);
    }

    #[test]
    fn test_blend_at_negative_is_ignored() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.blend_at(-1, 2, [255, 255, 255, 255]);
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_save_formats() {
        let dir = tempdir().unwrap();
        let mut fb = FrameBuffer::new(8, 6);
        fb.clear(Color::rgb(31, 33, 33));

        let ppm = dir.path().join("frame.ppm");
        fb.save(&ppm, FrameFormat::Ppm).unwrap();
        let bytes = std::fs::read(&ppm).unwrap();
        assert!(bytes.starts_with(b"P6\n8 6\n255\n"));
        assert_eq!(bytes.len(), "P6\n8 6\n255\n".len() + 8 * 6 * 3);

        let png = dir.path().join("frame.png");
        fb.save(&png, FrameFormat::Png).unwrap();
        let decoded = image::open(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(3, 3).0, [31, 33, 33, 255]);
    }
}
