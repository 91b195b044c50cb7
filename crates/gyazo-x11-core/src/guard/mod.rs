//! Deciding when a recording starts and stops.
//!
//! A [`RecordingGuard`] waits for a press-then-release of the toggle key to
//! start, and for another one (or an interrupt) to stop. Without a toggle key
//! recording starts at once and only an interrupt stops it.

mod hotkey;
mod interrupt;

pub use {
    hotkey::HotkeyToggleSource,
    interrupt::{InterruptSignal, ignore_interrupts},
};

use crate::{CaptureError, CoreResult};

use std::{panic::Location, str::FromStr, thread, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::hotkey::HotKey;
use tracing::{debug, info, instrument, warn};

/// How long each wait iteration blocks before rechecking the stop flag.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The key combination that starts and stops a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleKey {
    name: String,
    hotkey: HotKey,
}

impl ToggleKey {
    /// Alt+R.
    pub const DEFAULT: &'static str = "alt+KeyR";

    /// The registered hotkey.
    pub fn hotkey(&self) -> HotKey {
        self.hotkey
    }

    /// The key as configured, e.g. `alt+KeyR`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ToggleKey {
    type Err = CaptureError;

    #[track_caller]
    fn from_str(s: &str) -> CoreResult<Self> {
        let hotkey = HotKey::from_str(s).map_err(|e| CaptureError::Hotkey {
            reason: format!("invalid toggle key {:?}: {}", s, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            name: s.to_string(),
            hotkey,
        })
    }
}

/// Toggle key transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// The key went down.
    Press,
    /// The key went up.
    Release,
}

/// An exclusively grabbed toggle key.
pub trait ToggleKeySource {
    /// Grab the key so no other client sees it.
    fn grab(&mut self) -> CoreResult<()>;

    /// Give the key back.
    fn release(&mut self) -> CoreResult<()>;

    /// Wait up to `timeout` for the next event of the grabbed key.
    fn next_event(&mut self, timeout: Duration) -> CoreResult<Option<KeyEvent>>;
}

/// A stop flag raised asynchronously, e.g. from a signal handler.
pub trait StopSignal {
    /// Lower the flag.
    fn reset(&self);

    /// Start listening for the stop condition.
    fn arm(&self) -> CoreResult<()>;

    /// True once the stop condition occurred since the last reset.
    fn is_raised(&self) -> bool;
}

/// Detects a complete press-then-release of the toggle key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleTracker {
    pressed: bool,
}

impl ToggleTracker {
    /// Feed one key event; true when it completes a press/release pair.
    ///
    /// A release without a preceding press is ignored.
    pub fn observe(&mut self, event: KeyEvent) -> bool {
        match event {
            KeyEvent::Press => {
                self.pressed = true;
                false
            }
            KeyEvent::Release if self.pressed => {
                self.pressed = false;
                true
            }
            KeyEvent::Release => false,
        }
    }
}

/// RAII grab of a toggle key, released on drop.
struct KeyGrab<'a, K: ToggleKeySource> {
    source: &'a mut K,
}

impl<'a, K: ToggleKeySource> KeyGrab<'a, K> {
    fn acquire(source: &'a mut K) -> CoreResult<Self> {
        source.grab()?;
        Ok(Self { source })
    }
}

impl<K: ToggleKeySource> Drop for KeyGrab<'_, K> {
    fn drop(&mut self) {
        if let Err(e) = self.source.release() {
            warn!(error = ?e, "Failed to release toggle key");
        }
    }
}

/// Waits for the user to start and to stop a recording.
pub struct RecordingGuard<K: ToggleKeySource, S: StopSignal> {
    keys: Option<K>,
    stop: S,
    poll_interval: Duration,
}

impl<K: ToggleKeySource, S: StopSignal> RecordingGuard<K, S> {
    /// Guard driven by `keys` (if any) and `stop`.
    pub fn new(keys: Option<K>, stop: S) -> Self {
        Self {
            keys,
            stop,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override how often waits recheck the stop flag.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// True when a toggle key drives this guard.
    pub fn has_toggle_key(&self) -> bool {
        self.keys.is_some()
    }

    /// Block until the user asks to start recording.
    ///
    /// Returns immediately without a toggle key.
    #[instrument(skip(self))]
    pub fn wait_start(&mut self) -> CoreResult<()> {
        self.stop.reset();

        match self.keys.as_mut() {
            Some(keys) => {
                info!("Waiting for toggle key to start recording");
                wait_for_toggle(keys, &self.stop, self.poll_interval)
            }
            None => {
                debug!("No toggle key, starting immediately");
                Ok(())
            }
        }
    }

    /// Block until the toggle key is pressed again or an interrupt arrives.
    #[instrument(skip(self))]
    pub fn wait_finish(&mut self) -> CoreResult<()> {
        self.stop.reset();
        self.stop.arm()?;

        match self.keys.as_mut() {
            Some(keys) => wait_for_toggle(keys, &self.stop, self.poll_interval),
            None => {
                while !self.stop.is_raised() {
                    thread::sleep(self.poll_interval);
                }
                info!("Interrupt received");
                Ok(())
            }
        }
    }
}

fn wait_for_toggle<K: ToggleKeySource, S: StopSignal>(
    keys: &mut K,
    stop: &S,
    poll_interval: Duration,
) -> CoreResult<()> {
    let mut grab = KeyGrab::acquire(keys)?;
    let mut tracker = ToggleTracker::default();

    loop {
        if stop.is_raised() {
            info!("Interrupt received");
            return Ok(());
        }

        if let Some(event) = grab.source.next_event(poll_interval)? {
            debug!(?event, "Toggle key event");
            if tracker.observe(event) {
                info!("Toggle key released");
                return Ok(());
            }
        }
    }
}
