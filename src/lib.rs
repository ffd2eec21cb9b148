pub mod animation;
pub mod assets;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod palette;
pub mod pipeline;
pub mod renderer;
pub mod scenes;
pub mod script;
pub mod text;

pub use assets::AssetLoader;
pub use config::AppConfig;
pub use error::{SceneError, SceneResult};
pub use renderer::{Compositor, FrameBuffer, RenderEngine, RenderReport, Timeline};
pub use scenes::FinancialAnalysis;
pub use script::{Scene, SceneScript};
