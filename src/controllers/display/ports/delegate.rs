use crate::controllers::display::data::draw_task::DrawTask;

/// Supplies a fresh [`DrawTask`] each time a surface's contents go stale.
///
/// Called synchronously on the owning thread, so it must return promptly.
pub trait SurfaceDelegate<G> {
    fn new_display_task(&self) -> DrawTask<G>;
}

impl<G, F> SurfaceDelegate<G> for F
where
    F: Fn() -> DrawTask<G>,
{
    fn new_display_task(&self) -> DrawTask<G> {
        self()
    }
}
