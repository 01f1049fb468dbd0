//! Host boundary guard.
//!
//! Nothing may unwind or return an error into the host's signal dispatch.
//! Every signal handler body runs inside [`guard_signal`], which turns errors
//! and panics into log lines.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::TrackerError;

/// Run a signal handler body, containing any failure.
///
/// Returns `true` if the body completed without error.
pub fn guard_signal<F>(signal: &str, body: F) -> bool
where
    F: FnOnce() -> Result<(), TrackerError>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(signal = %signal, "event '{signal}' caused error: {e}");
            false
        }
        Err(payload) => {
            tracing::error!(
                signal = %signal,
                "event '{signal}' caused unexpected panic: {}",
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
