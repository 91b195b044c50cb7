use crate::{CaptureError, CoreResult, guard::StopSignal};

use std::{
    panic::Location,
    sync::atomic::{AtomicBool, Ordering},
};

use error_location::ErrorLocation;
use tracing::debug;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// SIGINT handler. Only touches an atomic, which is async-signal-safe.
extern "C" fn on_interrupt(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// SIGINT as a [`StopSignal`].
///
/// There is one process-wide flag behind every instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptSignal;

impl StopSignal for InterruptSignal {
    fn reset(&self) {
        INTERRUPTED.store(false, Ordering::SeqCst);
    }

    #[track_caller]
    fn arm(&self) -> CoreResult<()> {
        set_interrupt_disposition(on_interrupt as *const () as libc::sighandler_t)?;
        debug!("Interrupt handler installed");
        Ok(())
    }

    fn is_raised(&self) -> bool {
        INTERRUPTED.load(Ordering::SeqCst)
    }
}

/// Ignore SIGINT until a [`StopSignal`] is armed again.
///
/// Processes spawned meanwhile inherit the ignored disposition, so a Ctrl-C
/// aimed at the recorder does not kill its backend.
#[track_caller]
pub fn ignore_interrupts() -> CoreResult<()> {
    set_interrupt_disposition(libc::SIG_IGN)?;
    debug!("Interrupts ignored");
    Ok(())
}

#[track_caller]
fn set_interrupt_disposition(handler: libc::sighandler_t) -> CoreResult<()> {
    // SAFETY: `handler` is SIG_IGN or an extern "C" fn that only stores to
    // an atomic.
    let previous = unsafe { libc::signal(libc::SIGINT, handler) };

    if previous == libc::SIG_ERR {
        return Err(CaptureError::Io {
            source: std::io::Error::last_os_error(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(())
}
