use crate::error::{SceneError, SceneResult};
use crate::renderer::{Compositor, FrameBuffer, FrameFormat, Timeline, Viewport};
use crate::script::Scene;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output parameters for a render pass
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub format: FrameFormat,
    /// Worker threads; 0 uses one per CPU
    pub threads: usize,
}

/// Summary of a finished render
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub scene: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub frames: u32,
    pub duration: f32,
    pub directives: usize,
    /// SHA-256 over every frame's pixels, in frame order
    pub fingerprint: String,
    pub output_dir: Option<PathBuf>,
    pub video: Option<PathBuf>,
}

/// Main rendering engine
pub struct RenderEngine {
    scene: Scene,
    timeline: Timeline,
    viewport: Viewport,
    settings: RenderSettings,
}

impl RenderEngine {
    /// Create new render engine for a built scene
    pub fn new(scene: Scene, settings: RenderSettings) -> SceneResult<Self> {
        if settings.width == 0 || settings.height == 0 || settings.fps == 0 {
            return Err(SceneError::InvalidResolution {
                value: format!("{}x{}@{}", settings.width, settings.height, settings.fps),
            });
        }
        let timeline = Timeline::from_scene(&scene, settings.fps);
        let viewport = Viewport::new(settings.width, settings.height);

        Ok(Self {
            scene,
            timeline,
            viewport,
            settings,
        })
    }

    /// Render a single frame
    pub fn render_frame(&self, frame_number: u32) -> FrameBuffer {
        let mut buffer = FrameBuffer::new(self.settings.width, self.settings.height);
        buffer.clear(self.scene.background());

        let (segment, elapsed) = self.timeline.position_at_frame(frame_number);
        let states = self.scene.states_at(segment, elapsed);

        for (mobject, state) in self.scene.mobjects().iter().zip(&states) {
            Compositor::draw_mobject(
                &mut buffer,
                &self.viewport,
                self.scene.rasterizer(),
                mobject,
                state,
            );
        }

        buffer
    }

    pub fn frame_path(&self, output_dir: &Path, frame_number: u32) -> PathBuf {
        output_dir.join(format!(
            "frame_{:05}.{}",
            frame_number,
            self.settings.format.extension()
        ))
    }

    /// printf-style pattern matching `frame_path`, for ffmpeg
    pub fn frame_pattern(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("frame_%05d.{}", self.settings.format.extension()))
    }

    fn thread_pool(&self) -> Result<rayon::ThreadPool> {
        let threads = match self.settings.threads {
            0 => num_cpus::get(),
            n => n,
        };
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build render thread pool")
    }

    /// Render every frame, optionally writing each one into `output_dir`
    fn run(&self, output_dir: Option<&Path>) -> Result<String> {
        let total_frames = self.timeline.total_frames();
        let fps = self.timeline.fps();
        let pool = self.thread_pool()?;

        let digests = pool.install(|| {
            (0..total_frames)
                .into_par_iter()
                .map(|frame| -> Result<Vec<u8>> {
                    let buffer = self.render_frame(frame);
                    if let Some(dir) = output_dir {
                        buffer.save(&self.frame_path(dir, frame), self.settings.format)?;
                    }
                    if frame % fps == 0 {
                        debug!(frame, total_frames, "rendered frame");
                    }
                    Ok(Sha256::digest(buffer.as_bytes()).to_vec())
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut hasher = Sha256::new();
        for digest in &digests {
            hasher.update(digest);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Remove frames left in `output_dir` by an earlier render
    fn clear_stale_frames(output_dir: &Path) -> Result<usize> {
        let entries = std::fs::read_dir(output_dir)
            .with_context(|| format!("Failed to read output dir: {}", output_dir.display()))?;

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if is_frame_file(&path) {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove stale frame: {}", path.display()))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Render all frames to the output directory
    pub fn render(&self, output_dir: &Path) -> Result<RenderReport> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;
        let removed = Self::clear_stale_frames(output_dir)?;
        if removed > 0 {
            debug!(removed, "removed stale frames");
        }

        info!(
            frames = self.timeline.total_frames(),
            width = self.settings.width,
            height = self.settings.height,
            fps = self.settings.fps,
            "rendering frames"
        );
        let fingerprint = self.run(Some(output_dir))?;
        Ok(self.report(fingerprint, Some(output_dir.to_path_buf())))
    }

    /// Render all frames in memory and return only the fingerprint
    pub fn fingerprint(&self) -> Result<String> {
        self.run(None)
    }

    fn report(&self, fingerprint: String, output_dir: Option<PathBuf>) -> RenderReport {
        RenderReport {
            scene: String::new(),
            width: self.settings.width,
            height: self.settings.height,
            fps: self.settings.fps,
            frames: self.timeline.total_frames(),
            duration: self.scene.duration(),
            directives: self.scene.directives().len(),
            fingerprint,
            output_dir,
            video: None,
        }
    }

    /// Get timeline
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

/// `frame_NNNNN.png` or `frame_NNNNN.ppm`
fn is_frame_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some((stem, ext)) = name.strip_prefix("frame_").and_then(|n| n.split_once('.')) else {
        return false;
    };
    !stem.is_empty()
        && stem.bytes().all(|b| b.is_ascii_digit())
        && (ext == FrameFormat::Png.extension() || ext == FrameFormat::Ppm.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;
    use crate::scenes::FinancialAnalysis;
    use crate::text::GlyphRasterizer;
    use tempfile::tempdir;

    fn settings() -> RenderSettings {
        RenderSettings {
            width: 160,
            height: 90,
            fps: 5,
            format: FrameFormat::Ppm,
            threads: 2,
        }
    }

    fn create_engine() -> RenderEngine {
        let mut scene = Scene::new(GlyphRasterizer::Blocks);
        scene.build(&FinancialAnalysis).unwrap();
        RenderEngine::new(scene, settings()).unwrap()
    }

    #[test]
    fn test_render_engine_creation() {
        let engine = create_engine();
        assert_eq!(engine.timeline().total_frames(), 60);
    }

    #[test]
    fn test_rejects_zero_fps() {
        let mut scene = Scene::new(GlyphRasterizer::Blocks);
        scene.build(&FinancialAnalysis).unwrap();
        let result = RenderEngine::new(
            scene,
            RenderSettings {
                fps: 0,
                ..settings()
            },
        );
        assert!(matches!(result, Err(SceneError::InvalidResolution { .. })));
    }

    #[test]
    fn test_first_frame_is_background() {
        let engine = create_engine();
        let frame = engine.render_frame(0);
        let charcoal = Palette::load().unwrap().charcoal.rgba();
        assert!(frame.as_bytes().chunks_exact(4).all(|px| px == charcoal));
    }

    #[test]
    fn test_title_visible_after_write() {
        let engine = create_engine();
        // frame 12 falls in the wait after the title write
        let frame = engine.render_frame(12);
        let teal = Palette::load().unwrap().teal.rgba();
        assert!(frame.as_bytes().chunks_exact(4).any(|px| px == teal));
    }

    #[test]
    fn test_bars_visible_after_grow() {
        let engine = create_engine();
        let charcoal = Palette::load().unwrap().charcoal.rgba();
        // center of the tallest bar
        assert_eq!(engine.render_frame(12).get_pixel(80, 70), Some(charcoal));
        // second wait: frames 20..25
        assert_ne!(engine.render_frame(22).get_pixel(80, 70), Some(charcoal));
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = create_engine().fingerprint().unwrap();
        let second = create_engine().fingerprint().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_render_writes_frames() {
        let dir = tempdir().unwrap();
        let engine = create_engine();
        let report = engine.render(dir.path()).unwrap();

        assert_eq!(report.frames, 60);
        assert_eq!(report.directives, 9);
        assert!(engine.frame_path(dir.path(), 0).exists());
        assert!(engine.frame_path(dir.path(), 59).exists());
        assert!(!engine.frame_path(dir.path(), 60).exists());
        assert_eq!(report.fingerprint, engine.fingerprint().unwrap());
    }

    #[test]
    fn test_rerender_replaces_longer_render() {
        let dir = tempdir().unwrap();
        let mut scene = Scene::new(GlyphRasterizer::Blocks);
        scene.build(&FinancialAnalysis).unwrap();
        let longer = RenderEngine::new(
            scene,
            RenderSettings {
                fps: 10,
                format: FrameFormat::Png,
                ..settings()
            },
        )
        .unwrap();
        longer.render(dir.path()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        let engine = create_engine();
        let report = engine.render(dir.path()).unwrap();

        let frames: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| is_frame_file(p))
            .collect();
        assert_eq!(frames.len() as u32, report.frames);
        assert!(frames.iter().all(|p| p.extension().unwrap() == "ppm"));
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_is_frame_file() {
        assert!(is_frame_file(Path::new("out/frame_00012.png")));
        assert!(is_frame_file(Path::new("frame_00000.ppm")));
        assert!(!is_frame_file(Path::new("frame_cover.png")));
        assert!(!is_frame_file(Path::new("frame_00001.mp4")));
        assert!(!is_frame_file(Path::new("FinancialAnalysis.mp4")));
    }

    #[test]
    fn test_frame_naming() {
        let engine = create_engine();
        let dir = Path::new("out");
        assert_eq!(engine.frame_path(dir, 7), Path::new("out/frame_00007.ppm"));
        assert_eq!(engine.frame_pattern(dir), Path::new("out/frame_%05d.ppm"));
    }
}
