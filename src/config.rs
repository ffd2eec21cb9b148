use crate::error::{SceneError, SceneResult};
use crate::renderer::FrameFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    pub quality: Quality,
    /// Overrides the quality preset's resolution
    #[serde(default)]
    pub resolution: Option<Resolution>,
    /// Overrides the quality preset's frame rate
    #[serde(default)]
    pub fps: Option<u32>,
    pub output_dir: PathBuf,
    pub format: FrameFormat,
    pub encode: bool,
    pub video_name: String,
    pub threads: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    pub base_path: PathBuf,
    /// Font file for text; block glyphs are used when unset
    #[serde(default)]
    pub font: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    /// Prefix each event with its module path
    #[serde(default)]
    pub targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            targets: false,
        }
    }
}

/// Render quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
    Production,
}

impl Quality {
    /// (width, height, fps)
    pub fn settings(&self) -> (u32, u32, u32) {
        match self {
            Quality::Low => (854, 480, 15),
            Quality::Medium => (1280, 720, 30),
            Quality::High => (1920, 1080, 60),
            Quality::Production => (2560, 1440, 60),
        }
    }
}

/// Video resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    Named(String), // e.g., "1920x1080", "1280x720"
    Dimensions { width: u32, height: u32 },
}

impl Resolution {
    pub fn dimensions(&self) -> SceneResult<(u32, u32)> {
        let (width, height) = match self {
            Resolution::Named(s) => {
                let invalid = || SceneError::InvalidResolution { value: s.clone() };
                let (w, h) = s.split_once('x').ok_or_else(invalid)?;
                (
                    w.trim().parse().map_err(|_| invalid())?,
                    h.trim().parse().map_err(|_| invalid())?,
                )
            }
            Resolution::Dimensions { width, height } => (*width, *height),
        };

        if width == 0 || height == 0 {
            return Err(SceneError::InvalidResolution {
                value: format!("{}x{}", width, height),
            });
        }
        Ok((width, height))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig {
                quality: Quality::High,
                resolution: None,
                fps: None,
                output_dir: PathBuf::from("output"),
                format: FrameFormat::Png,
                encode: true,
                video_name: "FinancialAnalysis".to_string(),
                threads: 0,
            },
            assets: AssetsConfig {
                base_path: PathBuf::from("."),
                font: None,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `financial-reel.*` (or `path`), then `FINREEL_*` env vars
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(p) => config::File::from(p.to_path_buf()).required(true),
            None => config::File::with_name("financial-reel").required(false),
        };

        let builder = config::Config::builder()
            .set_default("render.quality", "high")?
            .set_default("render.output_dir", "output")?
            .set_default("render.format", "png")?
            .set_default("render.encode", true)?
            .set_default("render.video_name", "FinancialAnalysis")?
            .set_default("render.threads", 0)?
            .set_default("assets.base_path", ".")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("logging.targets", false)?
            .add_source(file)
            // Allow env var overrides (e.g. FINREEL_RENDER__QUALITY=low)
            .add_source(
                config::Environment::with_prefix("FINREEL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Final (width, height, fps) after presets and overrides
    pub fn output_settings(&self) -> SceneResult<(u32, u32, u32)> {
        let (mut width, mut height, mut fps) = self.render.quality.settings();
        if let Some(resolution) = &self.render.resolution {
            (width, height) = resolution.dimensions()?;
        }
        if let Some(override_fps) = self.render.fps {
            fps = override_fps;
        }
        Ok((width, height, fps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolution_parsing() {
        let res = Resolution::Named("1920x1080".to_string());
        assert_eq!(res.dimensions().unwrap(), (1920, 1080));

        let res = Resolution::Dimensions {
            width: 1280,
            height: 720,
        };
        assert_eq!(res.dimensions().unwrap(), (1280, 720));
    }

    #[test]
    fn test_resolution_invalid_format() {
        for value in ["invalid", "1920", "", "0x1080", "axb"] {
            let res = Resolution::Named(value.to_string());
            assert!(res.dimensions().is_err(), "{value}");
        }
    }

    #[test]
    fn test_quality_presets() {
        assert_eq!(Quality::Low.settings(), (854, 480, 15));
        assert_eq!(Quality::default().settings(), (1920, 1080, 60));
    }

    #[test]
    fn test_output_settings_overrides() {
        let mut config = AppConfig::default();
        assert_eq!(config.output_settings().unwrap(), (1920, 1080, 60));

        config.render.quality = Quality::Medium;
        config.render.fps = Some(24);
        assert_eq!(config.output_settings().unwrap(), (1280, 720, 24));

        config.render.resolution = Some(Resolution::Named("320x180".into()));
        assert_eq!(config.output_settings().unwrap(), (320, 180, 24));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[render]\nquality = \"low\"\nformat = \"ppm\"\nencode = false\nresolution = \"320x180\"\n\n[assets]\nfont = \"fonts/Inter.ttf\""
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.render.quality, Quality::Low);
        assert_eq!(config.render.format, FrameFormat::Ppm);
        assert!(!config.render.encode);
        assert_eq!(config.output_settings().unwrap(), (320, 180, 15));
        assert_eq!(config.assets.font, Some(PathBuf::from("fonts/Inter.ttf")));
        // untouched keys keep their defaults
        assert_eq!(config.render.video_name, "FinancialAnalysis");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.targets);
    }

    #[test]
    fn test_load_logging_section() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\njson = true\ntargets = true").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(config.logging.targets);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/financial-reel.toml"))).is_err());
    }
}
