mod presenters;
mod controllers;
mod core;
mod storage;

pub use controllers::display::{
    AsyncSurface, BackendError, Dispatcher, DisplayConfig, DisplayError, DisplayMode,
    DisplayPhase, DisplayStats, DisplayTicket, DrawTask, MainQueue, MainQueueHandle,
    RenderBackend, SurfaceDelegate, SurfaceHandle, SurfaceId,
};
pub use controllers::display::data::draw_task::{DidDisplayFn, DrawFn, WillDisplayFn};
pub use controllers::display::worker_pool::DisplayWorkerPool;

pub use crate::core::actions::cancellation::{CancelToken, Cancelled, GenerationToken, NeverCancel};
pub use crate::core::actions::fill_pixel_buffer::fill_pixel_buffer_parallel::{
    fill_pixel_buffer_parallel, fill_pixel_buffer_parallel_cancelable,
};
pub use crate::core::actions::fill_pixel_buffer::ports::pixel_shader::PixelShader;
pub use crate::core::data::colour::Colour;
pub use crate::core::data::pixel_buffer::{PixelBuffer, PixelBufferError};
pub use crate::core::data::point::Point;
pub use crate::core::data::size::Size;
pub use crate::core::render_state::RenderState;

pub use presenters::bitmap::backend::BitmapBackend;
pub use storage::write_ppm::write_ppm;
