//! Shared test helpers.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Runs `job` on its own thread and panics if it does not finish within
/// `limit`. Turns a deadlock regression into a fast test failure instead of
/// a wedged run; the limit should be a generous multiple of the job's
/// expected duration so slow CI never trips it.
pub fn deadline<T: Send + 'static>(
    limit: Duration,
    job: impl FnOnce() -> T + Send + 'static,
) -> T {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let _ = sender.send(job());
    });
    receiver
        .recv_timeout(limit)
        .expect("job exceeded its deadline, likely deadlocked")
}
