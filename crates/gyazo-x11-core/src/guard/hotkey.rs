use crate::{
    CaptureError, CoreResult,
    guard::{KeyEvent, ToggleKey, ToggleKeySource},
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tracing::{debug, info, instrument, warn};

/// Toggle key grabbed through the global hotkey manager.
///
/// On X11 registration is an exclusive key grab on the root window, so it
/// fails while another client holds the same combination.
pub struct HotkeyToggleSource {
    manager: GlobalHotKeyManager,
    key: ToggleKey,
    registered: bool,
}

impl HotkeyToggleSource {
    /// Create the manager; the key is not grabbed until [`ToggleKeySource::grab`].
    #[track_caller]
    #[instrument]
    pub fn new(key: ToggleKey) -> CoreResult<Self> {
        let manager = GlobalHotKeyManager::new().map_err(|e| CaptureError::Hotkey {
            reason: format!("Failed to create manager: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            manager,
            key,
            registered: false,
        })
    }
}

impl ToggleKeySource for HotkeyToggleSource {
    #[track_caller]
    fn grab(&mut self) -> CoreResult<()> {
        if self.registered {
            return Ok(());
        }

        self.manager
            .register(self.key.hotkey())
            .map_err(|e| CaptureError::GrabDenied {
                target: "toggle key",
                reason: format!("{}: {}", self.key.name(), e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.registered = true;
        info!(hotkey = self.key.name(), "Toggle key grabbed");

        Ok(())
    }

    #[track_caller]
    fn release(&mut self) -> CoreResult<()> {
        if !self.registered {
            return Ok(());
        }

        self.manager
            .unregister(self.key.hotkey())
            .map_err(|e| CaptureError::Hotkey {
                reason: format!("Failed to release {}: {}", self.key.name(), e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.registered = false;
        debug!(hotkey = self.key.name(), "Toggle key released");

        Ok(())
    }

    #[track_caller]
    fn next_event(&mut self, timeout: Duration) -> CoreResult<Option<KeyEvent>> {
        match GlobalHotKeyEvent::receiver().recv_timeout(timeout) {
            Ok(event) if event.id == self.key.hotkey().id() => Ok(Some(match event.state {
                HotKeyState::Pressed => KeyEvent::Press,
                _ => KeyEvent::Release,
            })),
            Ok(_) => Ok(None),
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(CaptureError::Hotkey {
                reason: format!("Hotkey event channel closed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl Drop for HotkeyToggleSource {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(hotkey = self.key.name(), error = ?e, "Failed to release toggle key");
        }
    }
}
