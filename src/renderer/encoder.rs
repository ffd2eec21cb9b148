use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

/// Handles video encoding using external FFmpeg process
pub struct VideoEncoder;

impl VideoEncoder {
    /// Check if FFmpeg is available
    pub fn is_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Encode a sequence of frames to a video file
    ///
    /// # Arguments
    /// * `frame_pattern` - Pattern for input frames (e.g., "output/frame_%05d.png")
    /// * `output_path` - Path for the output video (e.g., "output/FinancialAnalysis.mp4")
    /// * `frames` - Number of frames to read from the pattern
    /// * `fps` - Frames per second
    /// * `width` - Video width
    /// * `height` - Video height
    pub fn encode(
        frame_pattern: &Path,
        output_path: &Path,
        frames: u32,
        fps: u32,
        width: u32,
        height: u32,
    ) -> Result<()> {
        if !Self::is_available() {
            anyhow::bail!("FFmpeg not found. Please install ffmpeg to enable video encoding.");
        }

        info!(output = %output_path.display(), "encoding video");

        let status = Command::new("ffmpeg")
            .arg("-y") // Overwrite output
            .arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg("image2") // Input format
            .arg("-framerate")
            .arg(fps.to_string())
            .arg("-i")
            .arg(frame_pattern)
            .arg("-frames:v")
            .arg(frames.to_string())
            .arg("-c:v")
            .arg("libx264") // Video codec
            .arg("-pix_fmt")
            .arg("yuv420p") // Pixel format for compatibility
            .arg("-s")
            .arg(format!("{}x{}", width, height))
            .arg(output_path)
            .status()
            .context("Failed to execute ffmpeg")?;

        if !status.success() {
            anyhow::bail!("FFmpeg encoding failed with {}", status);
        }

        Ok(())
    }
}
