//! Interactive drag-to-select over a synchronous pointer grab.

use crate::{
    CoreResult, Point, Rect, X11Pointer,
    input::{EventQueue, PointerDevice, PointerEvent},
    overlay::{Overlay, RectangleFrame},
};

use tracing::{debug, info, instrument, trace, warn};

/// Drag state for the lifetime of one grab.
///
/// Buttons are counted, not identified: once a press was seen, a release of
/// any button decrements the count. Releases before the first press are
/// ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    anchor: Point,
    rect: Rect,
    pressed: i32,
    engaged: bool,
}

impl SelectionState {
    /// Fold one pointer event into the selection.
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press(at) => {
                self.anchor = at;
                self.rect = Rect::new(at.x, at.y, 0, 0);
                self.pressed += 1;
            }
            // The button that launched us may still be held when the grab
            // starts; its release precedes any press.
            PointerEvent::Release(_) if !self.engaged => {}
            PointerEvent::Release(_) => {
                self.pressed -= 1;
            }
            PointerEvent::Motion(at) => {
                self.rect = Rect::spanning(self.anchor, at);
            }
            PointerEvent::Other => {}
        }

        if self.pressed > 0 {
            self.engaged = true;
        }
    }

    /// True once the pressed count has dropped to zero after being positive.
    pub fn is_finished(&self) -> bool {
        self.engaged && self.pressed <= 0
    }

    /// The current selection.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Number of buttons currently counted as held.
    pub fn pressed(&self) -> i32 {
        self.pressed
    }
}

/// Runs one drag selection and renders it through an [`Overlay`].
pub struct RegionSelector<D: PointerDevice, O: Overlay> {
    events: EventQueue<D>,
    overlay: O,
}

impl<D: PointerDevice, O: Overlay> RegionSelector<D, O> {
    /// Selector over a pointer device and an overlay on the same screen.
    pub fn new(device: D, overlay: O) -> Self {
        Self {
            events: EventQueue::new(device),
            overlay,
        }
    }

    /// Grab the pointer and return the rectangle dragged by the user.
    ///
    /// The grab, the overlay and the device are released on every path.
    ///
    /// # Errors
    ///
    /// Returns `GrabDenied` if another client holds the pointer.
    #[instrument(skip(self))]
    pub fn select(mut self) -> CoreResult<Rect> {
        if let Err(e) = self.events.source_mut().grab() {
            warn!(error = ?e, "Pointer grab failed");
            if let Err(destroy_err) = self.overlay.destroy() {
                warn!(error = ?destroy_err, "Failed to destroy overlay");
            }
            return Err(e);
        }

        let tracked = self.track();
        let released = self.events.source_mut().release();
        let destroyed = self.overlay.destroy();

        let rect = tracked?;
        released?;
        destroyed?;

        info!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "Region selected"
        );

        Ok(rect)
    }

    fn track(&mut self) -> CoreResult<Rect> {
        let mut state = SelectionState::default();

        loop {
            let rect = state.rect();
            let shown = rect.has_area().then(|| rect.inner_outline());

            if let Some(outline) = shown {
                self.overlay.draw(outline)?;
            }

            self.events.source_mut().allow_next()?;
            let event = self.events.next()?;

            // Erase at the old coordinates before the event moves them.
            if let Some(outline) = shown {
                self.overlay.draw(outline)?;
            }

            let event = if event.is_motion() {
                self.coalesce(event)?
            } else {
                event
            };

            state.apply(event);
            trace!(?event, pressed = state.pressed(), "Pointer event applied");

            if state.is_finished() {
                return Ok(state.rect());
            }
        }
    }

    /// Skip queued motion so only the latest position in a burst is drawn.
    fn coalesce(&mut self, mut latest: PointerEvent) -> CoreResult<PointerEvent> {
        let mut skipped = 0usize;

        while self.events.has_more()? && self.events.peek()?.is_motion() {
            latest = self.events.next()?;
            skipped += 1;
        }

        if skipped > 0 {
            debug!(skipped, "Coalesced motion events");
        }

        Ok(latest)
    }
}

/// Let the user drag out a region on `display`.
#[instrument(skip(display))]
pub fn select_region(display: &str) -> CoreResult<Rect> {
    let pointer = X11Pointer::open(display)?;
    let frame = RectangleFrame::new(pointer.display())?;

    RegionSelector::new(pointer, frame).select()
}
