//! Pointer input with one event of lookahead.

mod x11;

pub use x11::X11Pointer;

use crate::{CoreResult, Point};

/// Pointer events delivered while the pointer is grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// A button went down at the given root position.
    Press(Point),
    /// A button went up at the given root position.
    Release(Point),
    /// The pointer moved with a button held.
    Motion(Point),
    /// Anything else the server delivered.
    Other,
}

impl PointerEvent {
    /// True for pointer motion.
    pub fn is_motion(&self) -> bool {
        matches!(self, PointerEvent::Motion(_))
    }
}

/// A blocking event stream that can also be polled.
pub trait EventSource {
    /// Event type produced by this source.
    type Event;

    /// Return an already queued event without blocking.
    fn poll_event(&mut self) -> CoreResult<Option<Self::Event>>;

    /// Block until the next event arrives.
    fn wait_event(&mut self) -> CoreResult<Self::Event>;
}

/// A synchronously grabbed pointer.
///
/// Events are frozen by the server until [`PointerDevice::allow_next`]
/// releases the next one.
pub trait PointerDevice: EventSource<Event = PointerEvent> {
    /// Take the exclusive pointer grab.
    fn grab(&mut self) -> CoreResult<()>;

    /// Let the server deliver the next frozen event.
    fn allow_next(&mut self) -> CoreResult<()>;

    /// Give the grab back.
    fn release(&mut self) -> CoreResult<()>;
}

/// One-slot lookahead buffer over an [`EventSource`].
pub struct EventQueue<S: EventSource> {
    source: S,
    head: Option<S::Event>,
}

impl<S: EventSource> EventQueue<S> {
    /// Wrap a source with an empty lookahead slot.
    pub fn new(source: S) -> Self {
        Self { source, head: None }
    }

    /// True iff an event can be returned without blocking.
    pub fn has_more(&mut self) -> CoreResult<bool> {
        if self.head.is_none() {
            self.head = self.source.poll_event()?;
        }
        Ok(self.head.is_some())
    }

    /// The next event, left in place for the following [`EventQueue::next`].
    pub fn peek(&mut self) -> CoreResult<&S::Event> {
        let head = match self.head.take() {
            Some(event) => event,
            None => self.source.wait_event()?,
        };
        Ok(self.head.insert(head))
    }

    /// Consume the peeked event, or block for a new one.
    pub fn next(&mut self) -> CoreResult<S::Event> {
        match self.head.take() {
            Some(event) => Ok(event),
            None => self.source.wait_event(),
        }
    }

    /// Access the wrapped source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
