use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

#[derive(Debug, Default)]
struct GateState {
    running: bool,
    exit: bool,
}

/// Run/pause signal of a menu loop together with its exit request, so a
/// paused loop wakes up when asked to exit.
#[derive(Debug, Default)]
pub struct Gate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl Gate {
    fn lock(&self) -> MutexGuard<GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset(&self) {
        *self.lock() = GateState::default();
        self.cond.notify_all();
    }

    pub fn set_running(&self, running: bool) {
        self.lock().running = running;
        self.cond.notify_all();
    }

    pub fn request_exit(&self) {
        self.lock().exit = true;
        self.cond.notify_all();
    }

    /// Loop is over, nobody will be running it until the next reset.
    pub fn stop(&self) {
        let mut state = self.lock();
        state.running = false;
        state.exit = true;
        self.cond.notify_all();
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Blocks while paused. Returns `false` once exit was requested.
    pub fn wait_running(&self) -> bool {
        let state = self
            .cond
            .wait_while(self.lock(), |s| !s.running && !s.exit)
            .unwrap_or_else(PoisonError::into_inner);
        !state.exit
    }

    /// Blocks until running, exit or timeout. Returns whether running was
    /// observed.
    pub fn wait_started(&self, timeout: Option<Duration>) -> bool {
        let guard = self.lock();
        let state = match timeout {
            None => self
                .cond
                .wait_while(guard, |s| !s.running && !s.exit)
                .unwrap_or_else(PoisonError::into_inner),
            Some(timeout) => {
                self.cond
                    .wait_timeout_while(guard, timeout, |s| !s.running && !s.exit)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
        };
        state.running
    }
}

/// One-shot signal, set when a menu loop has finished.
#[derive(Debug, Default)]
pub struct Latch {
    done: Mutex<bool>,
    cond: Condvar,
}

impl Latch {
    fn lock(&self) -> MutexGuard<bool> {
        self.done.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset(&self) {
        *self.lock() = false;
    }

    pub fn set(&self) {
        *self.lock() = true;
        self.cond.notify_all();
    }

    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let guard = self.lock();
        match timeout {
            None => *self
                .cond
                .wait_while(guard, |done| !*done)
                .unwrap_or_else(PoisonError::into_inner),
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                let mut guard = guard;
                while !*guard {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    guard = self
                        .cond
                        .wait_timeout(guard, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
                *guard
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn exit_wakes_paused_waiter() {
        let gate = Arc::new(Gate::default());
        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || gate.wait_running())
        };

        gate.request_exit();
        assert!(!waiter.join().unwrap());
    }

    #[test]
    fn running_releases_waiter() {
        let gate = Arc::new(Gate::default());
        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || gate.wait_started(None))
        };

        gate.set_running(true);
        assert!(waiter.join().unwrap());
        assert!(gate.wait_running());
    }

    #[test]
    fn wait_started_times_out() {
        let gate = Gate::default();
        assert!(!gate.wait_started(Some(Duration::from_millis(5))));
    }

    #[test]
    fn latch_wait() {
        let latch = Latch::default();
        assert!(!latch.wait(Some(Duration::from_millis(5))));
        latch.set();
        assert!(latch.wait(None));
        latch.reset();
        assert!(!latch.is_set());
    }
}
