use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Shutdown flag with interruptible waits.
///
/// The controller loop parks on this between hook events so that Ctrl-C or
/// an End keypress wakes it immediately instead of after a sleep expires.
pub struct ShutdownSignal {
    requested: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    /// Request shutdown and wake every waiting thread.
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless shutdown arrives first. Returns `true`
    /// when the wait was cut short by shutdown.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_shutdown() {
            return true;
        }

        let guard = match self.mutex.lock() {
            Ok(guard) => guard,
            // A poisoned mutex means another thread died mid-shutdown;
            // treat it the same as a triggered signal.
            Err(_) => return true,
        };

        match self
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_shutdown())
        {
            Ok((_, timeout)) => !timeout.timed_out(),
            Err(_) => true,
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_starts_clear() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
    }

    #[test]
    fn test_trigger_sets_flag() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        assert!(signal.is_shutdown());
    }

    #[test]
    fn test_wait_times_out_without_trigger() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        let interrupted = signal.wait(Duration::from_millis(50));
        assert!(!interrupted);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_trigger_interrupts_wait() {
        let signal = Arc::new(ShutdownSignal::new());
        let waiter = Arc::clone(&signal);

        let handle = thread::spawn(move || waiter.wait(Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(50));
        signal.trigger();

        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_wait_returns_immediately_after_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
