use crate::controllers::display::surface::SurfaceHandle;
use crate::core::actions::cancellation::CancelToken;
use crate::core::data::size::Size;

pub type WillDisplayFn = Box<dyn FnOnce(&SurfaceHandle)>;
pub type DrawFn<G> = Box<dyn FnOnce(&mut G, Size, &dyn CancelToken) + Send>;
pub type DidDisplayFn = Box<dyn FnOnce(&SurfaceHandle, bool) + Send>;

/// The three callbacks produced for a single redraw request.
///
/// - `will_display` runs once on the owning thread before any worker dispatch.
/// - `draw` runs once, inline or on a worker, with a fresh context sized to the
///   surface and a token it must poll during long work. Once the token reports
///   `true` it should return; the context contents are then discarded.
/// - `did_display` runs once on the owning thread with `finished = false` when
///   the draw was superseded or failed, `true` otherwise.
///
/// Any subset may be absent; a task with none of them is a no-op render.
pub struct DrawTask<G> {
    will_display: Option<WillDisplayFn>,
    draw: Option<DrawFn<G>>,
    did_display: Option<DidDisplayFn>,
}

pub(crate) struct DrawTaskParts<G> {
    pub will_display: Option<WillDisplayFn>,
    pub draw: Option<DrawFn<G>>,
    pub did_display: Option<DidDisplayFn>,
}

impl<G> DrawTask<G> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            will_display: None,
            draw: None,
            did_display: None,
        }
    }

    #[must_use]
    pub fn on_will_display(mut self, callback: impl FnOnce(&SurfaceHandle) + 'static) -> Self {
        self.will_display = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_draw(
        mut self,
        callback: impl FnOnce(&mut G, Size, &dyn CancelToken) + Send + 'static,
    ) -> Self {
        self.draw = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_did_display(
        mut self,
        callback: impl FnOnce(&SurfaceHandle, bool) + Send + 'static,
    ) -> Self {
        self.did_display = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.will_display.is_none() && self.draw.is_none() && self.did_display.is_none()
    }

    #[must_use]
    pub fn has_draw(&self) -> bool {
        self.draw.is_some()
    }

    pub(crate) fn into_parts(self) -> DrawTaskParts<G> {
        DrawTaskParts {
            will_display: self.will_display,
            draw: self.draw,
            did_display: self.did_display,
        }
    }
}

impl<G> Default for DrawTask<G> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<G> std::fmt::Debug for DrawTask<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawTask")
            .field("will_display", &self.will_display.is_some())
            .field("draw", &self.draw.is_some())
            .field("did_display", &self.did_display.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_task_has_no_callbacks() {
        let task: DrawTask<Vec<u8>> = DrawTask::empty();

        assert!(task.is_empty());
        assert!(!task.has_draw());
    }

    #[test]
    fn builder_sets_each_callback_independently() {
        let task: DrawTask<Vec<u8>> = DrawTask::empty().on_draw(|_, _, _| {});

        assert!(!task.is_empty());
        assert!(task.has_draw());

        let parts = task.into_parts();
        assert!(parts.will_display.is_none());
        assert!(parts.draw.is_some());
        assert!(parts.did_display.is_none());
    }

    #[test]
    fn debug_output_reports_which_callbacks_are_present() {
        let task: DrawTask<Vec<u8>> = DrawTask::default().on_did_display(|_, _| {});

        assert_eq!(
            format!("{task:?}"),
            "DrawTask { will_display: false, draw: false, did_display: true }"
        );
    }
}
