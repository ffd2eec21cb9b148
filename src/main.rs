use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use financial_reel::config::{AppConfig, Quality};
use financial_reel::logging::init_logging;
use financial_reel::renderer::FrameFormat;
use financial_reel::{pipeline, FinancialAnalysis, SceneScript};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "financial-reel")]
#[command(about = "Renders the AI financial analysis explainer scene", long_about = None)]
struct Cli {
    /// Config file (defaults to ./financial-reel.{toml,json,yaml} if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging with module targets
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the scene to frames and, if ffmpeg is available, a video
    Render(RenderArgs),

    /// Print the directive schedule without rendering
    Timeline {
        /// Output format
        #[arg(long, value_enum, default_value_t = TimelineFormat::Json)]
        format: TimelineFormat,

        /// Quality preset used to compute frame numbers
        #[arg(short, long, value_enum)]
        quality: Option<Quality>,
    },
}

#[derive(Args, Default)]
struct RenderArgs {
    /// Directory for frames and video
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Quality preset
    #[arg(short, long, value_enum)]
    quality: Option<Quality>,

    /// Frame image format
    #[arg(long, value_enum)]
    format: Option<FrameFormat>,

    /// Keep frames only, skip ffmpeg
    #[arg(long)]
    no_encode: bool,

    /// Font file for text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write the render report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimelineFormat {
    Json,
    Toml,
}

fn apply_render_args(config: &mut AppConfig, args: &RenderArgs) {
    if let Some(output) = &args.output {
        config.render.output_dir = output.clone();
    }
    if let Some(quality) = args.quality {
        config.render.quality = quality;
    }
    if let Some(format) = args.format {
        config.render.format = format;
    }
    if args.no_encode {
        config.render.encode = false;
    }
    if let Some(font) = &args.font {
        config.assets.font = Some(font.clone());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
        config.logging.targets = true;
    }
    init_logging(&config.logging);

    let scene = FinancialAnalysis;

    match cli.command.unwrap_or(Commands::Render(RenderArgs::default())) {
        Commands::Timeline { format, quality } => {
            if let Some(quality) = quality {
                config.render.quality = quality;
            }
            let engine = pipeline::prepare(&config, &scene)?;
            let summary = engine.timeline().summary(scene.name());
            let text = match format {
                TimelineFormat::Json => serde_json::to_string_pretty(&summary)?,
                TimelineFormat::Toml => toml::to_string_pretty(&summary)?,
            };
            println!("{}", text);
        }
        Commands::Render(args) => {
            apply_render_args(&mut config, &args);

            println!("🎬 Rendering {}\n", scene.name());
            let report = pipeline::run(&config, &scene)?;

            println!("📋 Render Summary:");
            println!("  Resolution: {}x{} @ {}fps", report.width, report.height, report.fps);
            println!("  Duration: {:.2}s ({} frames)", report.duration, report.frames);
            println!("  Directives: {}", report.directives);
            println!("  Fingerprint: {}", report.fingerprint);
            if let Some(dir) = &report.output_dir {
                println!("  Frames: {}", dir.display());
            }
            match &report.video {
                Some(video) => println!("\n✨ Video created successfully: {}", video.display()),
                None => println!("\n✨ Frames rendered successfully"),
            }

            if let Some(path) = &args.report {
                std::fs::write(path, serde_json::to_string_pretty(&report)?)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                println!("📄 Report exported to: {}", path.display());
            }
        }
    }

    Ok(())
}
