//! Test doubles for the core traits.

use crate::{
    CaptureError, CaptureTarget, CoreResult, EventSource, KeyEvent, Overlay, OverlayFactory,
    PointerDevice, PointerEvent, Rect, StopSignal, ToggleKeySource, VideoBackend,
};

use std::{
    collections::{HashSet, VecDeque},
    panic::Location,
    process::{Command, Stdio},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use error_location::ErrorLocation;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Pixels inverted by an X rectangle outline.
fn outline_pixels(outline: Rect) -> HashSet<(i32, i32)> {
    let right = outline.x + outline.width as i32;
    let bottom = outline.y + outline.height as i32;
    let mut pixels = HashSet::new();

    for x in outline.x..=right {
        pixels.insert((x, outline.y));
        pixels.insert((x, bottom));
    }
    for y in outline.y..=bottom {
        pixels.insert((outline.x, y));
        pixels.insert((right, y));
    }

    pixels
}

#[derive(Debug, Default)]
pub(crate) struct CanvasState {
    pub(crate) inverted: HashSet<(i32, i32)>,
    pub(crate) draws: Vec<Rect>,
    pub(crate) destroyed: usize,
}

/// A screen that XORs outlines, shared between overlays and the test.
#[derive(Debug, Clone, Default)]
pub(crate) struct XorCanvas {
    state: Arc<Mutex<CanvasState>>,
}

impl XorCanvas {
    pub(crate) fn overlay(&self) -> CanvasOverlay {
        CanvasOverlay {
            canvas: self.clone(),
            draws_left: None,
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        lock(&self.state).inverted.is_empty()
    }

    pub(crate) fn draws(&self) -> Vec<Rect> {
        lock(&self.state).draws.clone()
    }

    pub(crate) fn destroyed(&self) -> usize {
        lock(&self.state).destroyed
    }
}

/// Overlay on an [`XorCanvas`]; with `draws_left` set, the display goes
/// away after that many draws and every later call fails.
pub(crate) struct CanvasOverlay {
    canvas: XorCanvas,
    draws_left: Option<usize>,
}

#[track_caller]
fn display_gone() -> CaptureError {
    CaptureError::Display {
        reason: "display went away".to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

impl Overlay for CanvasOverlay {
    fn draw(&mut self, outline: Rect) -> CoreResult<()> {
        match self.draws_left.as_mut() {
            Some(0) => return Err(display_gone()),
            Some(left) => *left -= 1,
            None => {}
        }

        let mut state = lock(&self.canvas.state);
        for pixel in outline_pixels(outline) {
            if !state.inverted.remove(&pixel) {
                state.inverted.insert(pixel);
            }
        }
        state.draws.push(outline);
        Ok(())
    }

    fn destroy(self) -> CoreResult<()> {
        if self.draws_left == Some(0) {
            return Err(display_gone());
        }
        lock(&self.canvas.state).destroyed += 1;
        Ok(())
    }
}

/// Hands out overlays on one shared canvas, or fails to open.
#[derive(Debug, Clone, Default)]
pub(crate) struct CanvasFactory {
    pub(crate) canvas: XorCanvas,
    pub(crate) unavailable: bool,
    pub(crate) lost_after_draws: Option<usize>,
}

impl OverlayFactory for CanvasFactory {
    type Overlay = CanvasOverlay;

    #[track_caller]
    fn open(&self) -> CoreResult<CanvasOverlay> {
        if self.unavailable {
            return Err(CaptureError::Display {
                reason: "no display in tests".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(CanvasOverlay {
            canvas: self.canvas.clone(),
            draws_left: self.lost_after_draws,
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct PointerLog {
    pub(crate) grabs: usize,
    pub(crate) releases: usize,
    pub(crate) allows: usize,
}

/// A grabbed pointer replaying a fixed event script, all of it queued.
pub(crate) struct ScriptedPointer {
    events: VecDeque<PointerEvent>,
    deny_grab: bool,
    log: Arc<Mutex<PointerLog>>,
}

impl ScriptedPointer {
    pub(crate) fn new(events: impl IntoIterator<Item = PointerEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            deny_grab: false,
            log: Arc::default(),
        }
    }

    pub(crate) fn denying_grab() -> Self {
        Self {
            deny_grab: true,
            ..Self::new(Vec::<PointerEvent>::new())
        }
    }

    pub(crate) fn log(&self) -> Arc<Mutex<PointerLog>> {
        Arc::clone(&self.log)
    }

    pub(crate) fn snapshot(log: &Arc<Mutex<PointerLog>>) -> (usize, usize, usize) {
        let log = lock(log);
        (log.grabs, log.releases, log.allows)
    }
}

impl EventSource for ScriptedPointer {
    type Event = PointerEvent;

    fn poll_event(&mut self) -> CoreResult<Option<PointerEvent>> {
        Ok(self.events.pop_front())
    }

    #[track_caller]
    fn wait_event(&mut self) -> CoreResult<PointerEvent> {
        self.events.pop_front().ok_or_else(|| CaptureError::Display {
            reason: "event script exhausted".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl PointerDevice for ScriptedPointer {
    #[track_caller]
    fn grab(&mut self) -> CoreResult<()> {
        if self.deny_grab {
            return Err(CaptureError::GrabDenied {
                target: "pointer",
                reason: "AlreadyGrabbed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        lock(&self.log).grabs += 1;
        Ok(())
    }

    fn allow_next(&mut self) -> CoreResult<()> {
        lock(&self.log).allows += 1;
        Ok(())
    }

    fn release(&mut self) -> CoreResult<()> {
        lock(&self.log).releases += 1;
        Ok(())
    }
}

/// Plain event source over a queue, for lookahead tests.
pub(crate) struct VecSource {
    pub(crate) events: VecDeque<u32>,
    pub(crate) waits: usize,
}

impl VecSource {
    pub(crate) fn new(events: impl IntoIterator<Item = u32>) -> Self {
        Self {
            events: events.into_iter().collect(),
            waits: 0,
        }
    }
}

impl EventSource for VecSource {
    type Event = u32;

    fn poll_event(&mut self) -> CoreResult<Option<u32>> {
        Ok(self.events.pop_front())
    }

    #[track_caller]
    fn wait_event(&mut self) -> CoreResult<u32> {
        self.waits += 1;
        self.events.pop_front().ok_or_else(|| CaptureError::Display {
            reason: "source exhausted".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Toggle key replaying scripted events; `None` entries are timeouts.
pub(crate) struct ScriptedKeys {
    events: VecDeque<Option<KeyEvent>>,
    deny_grab: bool,
    pub(crate) grabs: Arc<AtomicUsize>,
    pub(crate) releases: Arc<AtomicUsize>,
}

impl ScriptedKeys {
    pub(crate) fn new(events: impl IntoIterator<Item = Option<KeyEvent>>) -> Self {
        Self {
            events: events.into_iter().collect(),
            deny_grab: false,
            grabs: Arc::default(),
            releases: Arc::default(),
        }
    }

    pub(crate) fn denying_grab() -> Self {
        Self {
            deny_grab: true,
            ..Self::new(Vec::<Option<KeyEvent>>::new())
        }
    }
}

impl ToggleKeySource for ScriptedKeys {
    #[track_caller]
    fn grab(&mut self) -> CoreResult<()> {
        if self.deny_grab {
            return Err(CaptureError::GrabDenied {
                target: "toggle key",
                reason: "already registered".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.grabs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) -> CoreResult<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn next_event(&mut self, timeout: Duration) -> CoreResult<Option<KeyEvent>> {
        match self.events.pop_front() {
            Some(event) => Ok(event),
            None => {
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}

/// Stop flag raised by the test instead of by a signal.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlagSignal {
    pub(crate) raised: Arc<AtomicBool>,
    pub(crate) armed: Arc<AtomicBool>,
}

impl FlagSignal {
    /// Raise the flag from another thread after `delay`.
    pub(crate) fn raise_after(&self, delay: Duration) -> thread::JoinHandle<()> {
        let raised = Arc::clone(&self.raised);
        thread::spawn(move || {
            thread::sleep(delay);
            raised.store(true, Ordering::SeqCst);
        })
    }
}

impl StopSignal for FlagSignal {
    fn reset(&self) {
        self.raised.store(false, Ordering::SeqCst);
    }

    fn arm(&self) -> CoreResult<()> {
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// Video backend running a shell script in place of an encoder.
#[derive(Debug, Clone)]
pub(crate) struct ShellBackend {
    pub(crate) program: String,
    pub(crate) script: String,
}

impl ShellBackend {
    pub(crate) fn new(script: impl Into<String>) -> Self {
        Self {
            program: "sh".to_string(),
            script: script.into(),
        }
    }
}

impl VideoBackend for ShellBackend {
    fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, _target: &CaptureTarget) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-c")
            .arg(&self.script)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}
