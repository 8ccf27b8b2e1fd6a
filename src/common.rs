//! Small shared helpers used across stages.

use crate::core::errors::{Error, Result};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run a blocking operation on a worker thread, failing with a typed
/// timeout error if it does not complete in time.
///
/// Used to wrap every external invocation (model provider, checkpoint
/// provider) so no stage can hang the pipeline. The worker thread is
/// detached on timeout; its eventual result is dropped.
pub fn run_with_timeout<T, F>(operation: &str, timeout: Duration, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(work());
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(operation, timeout)),
    }
}
