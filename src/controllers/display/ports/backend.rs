use crate::controllers::display::errors::BackendError;
use crate::controllers::display::surface::SurfaceHandle;
use crate::core::data::colour::Colour;
use crate::core::data::size::Size;

/// The graphics primitive behind a surface.
///
/// `new_context` may be called from any worker; `present` and `release` are
/// only ever called on the owning thread.
pub trait RenderBackend: Send + Sync + 'static {
    type Context: Send + 'static;

    fn new_context(&self, size: Size) -> Result<Self::Context, BackendError>;

    /// Makes a finished context the surface's visible contents.
    fn present(&self, surface: &SurfaceHandle, context: Self::Context) -> Result<(), BackendError>;

    fn clear(&self, _context: &mut Self::Context, _background: Colour) {}

    /// Called when a surface is torn down.
    fn release(&self, _surface: &SurfaceHandle) {}
}
