//! Task scheduling facilities.

use crate::core::error;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A handle to cancel a scheduled task if required.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    fn new() -> CancelHandle {
        CancelHandle(Arc::new(AtomicBool::new(false)))
    }

    /// Signals the task to stop.
    /// The task will not run again once it notices, but may be sleeping until then.
    pub fn cancel(&self) {
        self.0.store(true, SeqCst);
    }

    /// True if `cancel()` was called on this handle or any of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(SeqCst)
    }
}

/// Schedule a task to run periodically.
/// Starts a new thread for every task.
pub fn set_schedule<F>(thread_name: &str, every: Duration, operation: F) -> error::Result<CancelHandle>
where
    F: Fn() + Send + 'static,
{
    let handle = CancelHandle::new();
    let inner_handle = handle.clone();

    thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || loop {
            thread::sleep(every);
            if inner_handle.is_cancelled() {
                break;
            }
            operation();
        })?;
    Ok(handle)
}
