//! Inverting rectangle outlines drawn straight onto the root window.
//!
//! Every draw inverts the pixels under the outline, so drawing the same
//! outline twice restores the screen. Callers show and hide a frame with the
//! same call.

mod x11;

pub use x11::{RectangleFrame, X11OverlayFactory};

use crate::{CoreResult, Rect};

/// A surface that toggles rectangle outlines.
pub trait Overlay {
    /// Invert the outline of `outline` and flush it to the display.
    fn draw(&mut self, outline: Rect) -> CoreResult<()>;

    /// Release the drawing resources.
    fn destroy(self) -> CoreResult<()>
    where
        Self: Sized;
}

/// Opens a fresh overlay on its own connection.
///
/// The recording worker calls this from its own thread, so the factory is
/// sent across threads while the overlay it produces never is.
pub trait OverlayFactory: Clone + Send + 'static {
    /// Overlay type produced by this factory.
    type Overlay: Overlay;

    /// Open a new overlay.
    fn open(&self) -> CoreResult<Self::Overlay>;
}
