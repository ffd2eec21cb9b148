use crate::assets::AssetLoader;
use crate::config::AppConfig;
use crate::renderer::{RenderEngine, RenderReport, RenderSettings, VideoEncoder};
use crate::script::{Scene, SceneScript};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Build a scene from `script` with the configured font
pub fn build_scene(config: &AppConfig, script: &dyn SceneScript) -> Result<Scene> {
    let mut loader = AssetLoader::new(&config.assets.base_path);
    let rasterizer = loader.rasterizer(config.assets.font.as_deref())?;

    let mut scene = Scene::new(rasterizer);
    scene
        .build(script)
        .with_context(|| format!("Failed to construct scene {}", script.name()))?;
    Ok(scene)
}

/// Build the engine for `script` using the configured output settings
pub fn prepare(config: &AppConfig, script: &dyn SceneScript) -> Result<RenderEngine> {
    let (width, height, fps) = config.output_settings()?;
    let scene = build_scene(config, script)?;
    let settings = RenderSettings {
        width,
        height,
        fps,
        format: config.render.format,
        threads: config.render.threads,
    };
    Ok(RenderEngine::new(scene, settings)?)
}

/// Render frames, then encode them to video when enabled and ffmpeg exists
pub fn run(config: &AppConfig, script: &dyn SceneScript) -> Result<RenderReport> {
    let engine = prepare(config, script)?;
    let output_dir = &config.render.output_dir;

    let mut report = engine.render(output_dir)?;
    report.scene = script.name().to_string();

    if !config.render.encode {
        info!("video encoding disabled, frames kept in {}", output_dir.display());
        return Ok(report);
    }

    if VideoEncoder::is_available() {
        let video = output_dir.join(format!("{}.mp4", config.render.video_name));
        VideoEncoder::encode(
            &engine.frame_pattern(output_dir),
            &video,
            report.frames,
            report.fps,
            report.width,
            report.height,
        )?;
        info!(video = %video.display(), "video created");
        report.video = Some(video);
    } else {
        warn!(
            "FFmpeg not found, skipping video encoding; frames are in {}",
            output_dir.display()
        );
    }

    Ok(report)
}
