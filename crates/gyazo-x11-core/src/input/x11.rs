use crate::{
    CaptureError, CoreResult, Point, X11Display,
    input::{EventSource, PointerDevice, PointerEvent},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, instrument, warn};
use x11rb::{
    CURRENT_TIME,
    connection::Connection,
    protocol::{
        Event,
        xproto::{Allow, ConnectionExt as _, Cursor, EventMask, GrabMode, GrabStatus},
    },
};

// XC_cross in the standard cursor font.
const XC_CROSS: u16 = 30;

/// The root window pointer of one X connection, grabbed synchronously.
pub struct X11Pointer {
    display: X11Display,
    cursor: Cursor,
    grabbed: bool,
}

impl X11Pointer {
    /// Connect to `name` and prepare the selection cursor.
    #[track_caller]
    #[instrument]
    pub fn open(name: &str) -> CoreResult<Self> {
        let display = X11Display::open(name)?;
        let cursor = create_cross_cursor(&display)?;

        Ok(Self {
            display,
            cursor,
            grabbed: false,
        })
    }

    /// The connection this pointer is grabbed on.
    pub fn display(&self) -> &X11Display {
        &self.display
    }
}

#[track_caller]
fn create_cross_cursor(display: &X11Display) -> CoreResult<Cursor> {
    let conn = display.conn();

    let font = conn
        .generate_id()
        .map_err(|e| CaptureError::display(format!("font id: {}", e)))?;
    conn.open_font(font, b"cursor")
        .map_err(|e| CaptureError::display(format!("open cursor font: {}", e)))?;

    let cursor = conn
        .generate_id()
        .map_err(|e| CaptureError::display(format!("cursor id: {}", e)))?;
    conn.create_glyph_cursor(
        cursor,
        font,
        font,
        XC_CROSS,
        XC_CROSS + 1,
        0,
        0,
        0,
        0xFFFF,
        0xFFFF,
        0xFFFF,
    )
    .map_err(|e| CaptureError::display(format!("create cursor: {}", e)))?;

    conn.close_font(font)
        .map_err(|e| CaptureError::display(format!("close cursor font: {}", e)))?;

    Ok(cursor)
}

impl EventSource for X11Pointer {
    type Event = PointerEvent;

    fn poll_event(&mut self) -> CoreResult<Option<PointerEvent>> {
        let event = self
            .display
            .conn()
            .poll_for_event()
            .map_err(|e| CaptureError::display(format!("poll event: {}", e)))?;

        event.map(to_pointer_event).transpose()
    }

    fn wait_event(&mut self) -> CoreResult<PointerEvent> {
        let event = self
            .display
            .conn()
            .wait_for_event()
            .map_err(|e| CaptureError::display(format!("wait event: {}", e)))?;

        to_pointer_event(event)
    }
}

impl PointerDevice for X11Pointer {
    #[track_caller]
    #[instrument(skip(self))]
    fn grab(&mut self) -> CoreResult<()> {
        let conn = self.display.conn();
        let root = self.display.screen().root;

        let reply = conn
            .grab_pointer(
                false,
                root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::BUTTON_MOTION,
                GrabMode::SYNC,
                GrabMode::ASYNC,
                root,
                self.cursor,
                CURRENT_TIME,
            )
            .map_err(|e| CaptureError::display(format!("grab pointer: {}", e)))?
            .reply()
            .map_err(|e| CaptureError::display(format!("grab pointer reply: {}", e)))?;

        if reply.status != GrabStatus::SUCCESS {
            return Err(CaptureError::GrabDenied {
                target: "pointer",
                reason: format!("server answered {:?}", reply.status),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.grabbed = true;
        debug!("Pointer grabbed");

        Ok(())
    }

    fn allow_next(&mut self) -> CoreResult<()> {
        let conn = self.display.conn();
        conn.allow_events(Allow::SYNC_POINTER, CURRENT_TIME)
            .map_err(|e| CaptureError::display(format!("allow events: {}", e)))?;
        conn.flush()
            .map_err(|e| CaptureError::display(format!("flush: {}", e)))
    }

    #[instrument(skip(self))]
    fn release(&mut self) -> CoreResult<()> {
        if !self.grabbed {
            return Ok(());
        }

        let conn = self.display.conn();
        conn.ungrab_pointer(CURRENT_TIME)
            .map_err(|e| CaptureError::display(format!("ungrab pointer: {}", e)))?;
        conn.flush()
            .map_err(|e| CaptureError::display(format!("flush: {}", e)))?;

        self.grabbed = false;
        debug!("Pointer released");

        Ok(())
    }
}

impl Drop for X11Pointer {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = ?e, "Failed to release pointer grab");
        }

        let conn = self.display.conn();
        if let Err(e) = conn.free_cursor(self.cursor) {
            warn!(error = ?e, "Failed to free selection cursor");
        }
        if let Err(e) = conn.flush() {
            warn!(error = ?e, "Failed to flush on pointer close");
        }
    }
}

#[track_caller]
fn to_pointer_event(event: Event) -> CoreResult<PointerEvent> {
    let pointer_event = match event {
        Event::ButtonPress(e) => PointerEvent::Press(Point::new(e.root_x.into(), e.root_y.into())),
        Event::ButtonRelease(e) => {
            PointerEvent::Release(Point::new(e.root_x.into(), e.root_y.into()))
        }
        Event::MotionNotify(e) => PointerEvent::Motion(Point::new(e.root_x.into(), e.root_y.into())),
        Event::Error(e) => return Err(CaptureError::display(format!("X error: {:?}", e))),
        _ => PointerEvent::Other,
    };

    Ok(pointer_event)
}
