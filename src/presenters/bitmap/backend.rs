use crate::controllers::display::errors::BackendError;
use crate::controllers::display::ports::backend::RenderBackend;
use crate::controllers::display::surface::{SurfaceHandle, SurfaceId};
use crate::core::data::colour::Colour;
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::size::Size;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// An in-memory backend that draws into [`PixelBuffer`]s and keeps the last
/// presented bitmap of every surface.
#[derive(Debug, Default)]
pub struct BitmapBackend {
    max_pixels: Option<usize>,
    contents: Mutex<HashMap<SurfaceId, Arc<PixelBuffer>>>,
    presented: AtomicU64,
}

impl BitmapBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses to allocate contexts larger than `max_pixels`.
    #[must_use]
    pub fn with_max_pixels(max_pixels: usize) -> Self {
        Self {
            max_pixels: Some(max_pixels),
            ..Self::default()
        }
    }

    /// The committed bitmap of a surface, if it has one.
    #[must_use]
    pub fn contents(&self, surface: SurfaceId) -> Option<Arc<PixelBuffer>> {
        self.lock_contents().get(&surface).cloned()
    }

    #[must_use]
    pub fn presented_count(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }

    fn lock_contents(&self) -> MutexGuard<'_, HashMap<SurfaceId, Arc<PixelBuffer>>> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderBackend for BitmapBackend {
    type Context = PixelBuffer;

    fn new_context(&self, size: Size) -> Result<PixelBuffer, BackendError> {
        match self.max_pixels {
            Some(max_pixels) if size.pixel_count() > max_pixels => Err(BackendError::Allocation {
                size,
                reason: format!("exceeds the {max_pixels} pixel limit"),
            }),
            _ => PixelBuffer::new(size).map_err(|err| BackendError::Allocation {
                size,
                reason: err.to_string(),
            }),
        }
    }

    fn present(&self, surface: &SurfaceHandle, context: PixelBuffer) -> Result<(), BackendError> {
        if !surface.is_alive() {
            return Err(BackendError::Present(format!(
                "{} has been torn down",
                surface.id()
            )));
        }

        let size = context.size();
        self.lock_contents().insert(surface.id(), Arc::new(context));
        self.presented.fetch_add(1, Ordering::Relaxed);
        trace!(surface = %surface.id(), width = size.width, height = size.height, "bitmap presented");

        Ok(())
    }

    fn clear(&self, context: &mut PixelBuffer, background: Colour) {
        context.fill(background);
    }

    fn release(&self, surface: &SurfaceHandle) {
        if self.lock_contents().remove(&surface.id()).is_some() {
            debug!(surface = %surface.id(), "bitmap released");
        }
    }
}
