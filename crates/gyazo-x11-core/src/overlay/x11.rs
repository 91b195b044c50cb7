use crate::{
    CaptureError, CoreResult, Rect, X11Display,
    overlay::{Overlay, OverlayFactory},
};

use std::rc::Rc;

use tracing::{debug, instrument};
use x11rb::{
    connection::Connection,
    protocol::xproto::{
        ConnectionExt as _, CreateGCAux, GX, Gcontext, Rectangle as XRectangle, SubwindowMode,
        Window,
    },
    rust_connection::RustConnection,
};

/// GXinvert graphics context on the root window.
pub struct RectangleFrame {
    conn: Rc<RustConnection>,
    root: Window,
    gc: Gcontext,
}

impl RectangleFrame {
    /// Create the inverting graphics context on the display's root window.
    #[track_caller]
    #[instrument(skip(display))]
    pub fn new(display: &X11Display) -> CoreResult<Self> {
        let conn = Rc::clone(display.conn());
        let screen = display.screen();
        let (root, foreground, background) =
            (screen.root, screen.white_pixel, screen.black_pixel);

        let gc = conn
            .generate_id()
            .map_err(|e| CaptureError::display(format!("gc id: {}", e)))?;

        let aux = CreateGCAux::new()
            .foreground(foreground)
            .background(background)
            .function(GX::INVERT)
            .plane_mask(foreground ^ background)
            .subwindow_mode(SubwindowMode::INCLUDE_INFERIORS);

        conn.create_gc(gc, root, &aux)
            .map_err(|e| CaptureError::display(format!("create gc: {}", e)))?;

        debug!(gc, root, "Rectangle frame created");

        Ok(Self { conn, root, gc })
    }
}

impl Overlay for RectangleFrame {
    #[track_caller]
    fn draw(&mut self, outline: Rect) -> CoreResult<()> {
        self.conn
            .poly_rectangle(self.root, self.gc, &[to_x_rectangle(outline)])
            .map_err(|e| CaptureError::display(format!("draw rectangle: {}", e)))?;

        // Unflushed requests would merge a show and a hide into one batch.
        self.conn
            .flush()
            .map_err(|e| CaptureError::display(format!("flush: {}", e)))
    }

    #[track_caller]
    fn destroy(self) -> CoreResult<()> {
        self.conn
            .free_gc(self.gc)
            .map_err(|e| CaptureError::display(format!("free gc: {}", e)))?;
        self.conn
            .flush()
            .map_err(|e| CaptureError::display(format!("flush: {}", e)))?;

        debug!(gc = self.gc, "Rectangle frame destroyed");

        Ok(())
    }
}

/// Opens a [`RectangleFrame`] on a new connection to a fixed display.
#[derive(Debug, Clone)]
pub struct X11OverlayFactory {
    display: String,
}

impl X11OverlayFactory {
    /// Factory for overlays on `display`.
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
        }
    }
}

impl OverlayFactory for X11OverlayFactory {
    type Overlay = RectangleFrame;

    fn open(&self) -> CoreResult<RectangleFrame> {
        let display = X11Display::open(&self.display)?;
        RectangleFrame::new(&display)
    }
}

fn to_x_rectangle(rect: Rect) -> XRectangle {
    XRectangle {
        x: clamp_i16(rect.x),
        y: clamp_i16(rect.y),
        width: clamp_u16(rect.width),
        height: clamp_u16(rect.height),
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn clamp_u16(value: u32) -> u16 {
    value.min(u32::from(u16::MAX)) as u16
}
