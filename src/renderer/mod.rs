pub mod compositor;
pub mod encoder;
pub mod engine;
pub mod frame_buffer;
pub mod timeline;

pub use compositor::{Compositor, Viewport};
pub use encoder::VideoEncoder;
pub use engine::{RenderEngine, RenderReport, RenderSettings};
pub use frame_buffer::{FrameBuffer, FrameFormat};
pub use timeline::Timeline;
