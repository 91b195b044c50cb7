use crate::{CaptureError, CoreResult};

use std::rc::Rc;

use tracing::{debug, instrument};
use x11rb::{connection::Connection, protocol::xproto::Screen, rust_connection::RustConnection};

/// Display used when `DISPLAY` is not set.
pub const DEFAULT_DISPLAY: &str = ":0.0";

/// Resolve the X display target from the environment.
pub fn display_target() -> String {
    std::env::var("DISPLAY")
        .ok()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DISPLAY.to_string())
}

/// An exclusively owned X server connection.
///
/// Each component opens its own; dropping the last handle closes it.
pub struct X11Display {
    conn: Rc<RustConnection>,
    screen_num: usize,
}

impl X11Display {
    /// Connect to the named display.
    #[track_caller]
    #[instrument]
    pub fn open(name: &str) -> CoreResult<Self> {
        let (conn, screen_num) = x11rb::connect(Some(name))
            .map_err(|e| CaptureError::display(format!("cannot open {}: {}", name, e)))?;

        debug!(display = name, screen_num, "Display connected");

        Ok(Self {
            conn: Rc::new(conn),
            screen_num,
        })
    }

    pub(crate) fn conn(&self) -> &Rc<RustConnection> {
        &self.conn
    }

    pub(crate) fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }
}
