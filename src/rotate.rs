//! Rotation signal plumbing.
//!
//! `reopen` calls `open` and `close`, so it must not run inside a signal
//! handler. The handler installed here only raises a flag; the host's main
//! loop polls [`take_rotate_request`] at a convenient point and calls
//! [`Logger::reopen`] itself:
//!
//! ```no_run
//! use relog::{rotate, Logger};
//!
//! rotate::install().unwrap();
//! loop {
//!     if rotate::take_rotate_request() {
//!         Logger::reopen();
//!     }
//!     // serve requests
//!     # break;
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::logger::LogError;

static ROTATE_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sighup(_signal: libc::c_int) {
    ROTATE_REQUESTED.store(true, Ordering::SeqCst);
}

/// Installs the SIGHUP handler. Call once at process start, after
/// `Logger::init`.
pub fn install() -> Result<(), LogError> {
    let action = SigAction::new(
        SigHandler::Handler(handle_sighup),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe { sigaction(Signal::SIGHUP, &action) }?;
    Ok(())
}

/// Returns true once per received SIGHUP, clearing the flag.
pub fn take_rotate_request() -> bool {
    ROTATE_REQUESTED.swap(false, Ordering::SeqCst)
}
