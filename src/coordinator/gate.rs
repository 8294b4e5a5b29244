//! Start gate for worker threads
//!
//! A barrier that the coordinator releases explicitly. Workers call
//! `arrive_and_wait()`; the coordinator waits until every worker has arrived
//! and then calls `open()`, so no worker gets a head start. Unlike
//! `std::sync::Barrier`, the gate can be aborted: if dispatch fails halfway,
//! the workers already waiting are released without sampling.

use std::sync::{Condvar, Mutex};

#[derive(Debug, Default)]
struct GateState {
    arrived: usize,
    open: bool,
    aborted: bool,
}

/// Explicitly released start barrier
#[derive(Debug)]
pub struct StartGate {
    parties: usize,
    state: Mutex<GateState>,
    cond: Condvar,
}

impl StartGate {
    /// Create a gate for `parties` workers
    pub fn new(parties: usize) -> Self {
        Self {
            parties,
            state: Mutex::new(GateState::default()),
            cond: Condvar::new(),
        }
    }

    /// Register arrival and block until the gate opens or is aborted
    ///
    /// Returns `true` if the gate opened, `false` if it was aborted.
    pub fn arrive_and_wait(&self) -> bool {
        let mut state = self.lock();
        state.arrived += 1;
        self.cond.notify_all();

        while !state.open && !state.aborted {
            state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
        }

        state.open
    }

    /// Block until all parties have arrived
    ///
    /// Returns `false` if the gate was aborted while waiting.
    pub fn wait_for_arrivals(&self) -> bool {
        let mut state = self.lock();

        while state.arrived < self.parties && !state.aborted {
            state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
        }

        !state.aborted
    }

    /// Release every waiting worker
    pub fn open(&self) {
        let mut state = self.lock();
        if !state.aborted {
            state.open = true;
        }
        self.cond.notify_all();
    }

    /// Release every waiting worker without letting them run
    pub fn abort(&self) {
        let mut state = self.lock();
        if !state.open {
            state.aborted = true;
        }
        self.cond.notify_all();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GateState> {
        // Gate state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_gate_holds_until_open() {
        let gate = Arc::new(StartGate::new(3));
        let passed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let gate = gate.clone();
                let passed = passed.clone();
                thread::spawn(move || {
                    if gate.arrive_and_wait() {
                        passed.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        assert!(gate.wait_for_arrivals());
        thread::sleep(Duration::from_millis(20));
        assert_eq!(passed.load(Ordering::SeqCst), 0);

        gate.open();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(passed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_gate_abort_releases_waiters() {
        let gate = Arc::new(StartGate::new(2));

        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || gate.arrive_and_wait())
        };

        thread::sleep(Duration::from_millis(10));
        gate.abort();

        assert!(!waiter.join().unwrap());
        assert!(!gate.wait_for_arrivals());
    }

    #[test]
    fn test_open_after_abort_stays_closed() {
        let gate = StartGate::new(1);
        gate.abort();
        gate.open();
        assert!(!gate.arrive_and_wait());
    }
}
