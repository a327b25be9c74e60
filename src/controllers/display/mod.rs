//! Asynchronous surface display.
//!
//! This module coordinates redraws of a surface whose pixels are produced off
//! the owning thread, without letting stale output overwrite newer content.
//!
//! # Architecture
//!
//! - **Input**: [`AsyncSurface::set_needs_display`], which bumps the surface's
//!   render generation and asks its [`SurfaceDelegate`] for a [`DrawTask`]
//! - **Output**: [`RenderBackend`], which allocates drawing contexts and
//!   presents finished ones
//! - **Core**: [`Dispatcher`], which runs the task's callbacks on the owning
//!   thread and a worker pool, marshalling completions back via [`MainQueue`]

pub mod config;
pub mod data;
mod dispatcher;
pub mod errors;
pub mod main_queue;
pub mod ports;
pub mod surface;
pub mod worker_pool;

#[cfg(test)]
mod test_support;

pub use config::DisplayConfig;
pub use data::display_phase::{DisplayMode, DisplayPhase, DisplayTicket};
pub use data::display_stats::DisplayStats;
pub use data::draw_task::DrawTask;
pub use dispatcher::Dispatcher;
pub use errors::{BackendError, DisplayError};
pub use main_queue::{MainQueue, MainQueueHandle};
pub use ports::backend::RenderBackend;
pub use ports::delegate::SurfaceDelegate;
pub use surface::{AsyncSurface, SurfaceHandle, SurfaceId};
