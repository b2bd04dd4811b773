//! Physics step scheduling
//!
//! The scheduler decouples physics stepping from the frame loop. In dual
//! mode a worker thread performs the steps; the frame loop only requests
//! them (`signal`) and waits for completion (`wait`). The frame contract is
//! strict: render, then wait, then refresh, then signal, so a step always
//! runs concurrently with rendering and never concurrently with refresh.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::simulation::SharedSimulation;

/// How physics steps are executed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerMode {
    /// Steps run inline on the caller's thread during `wait`
    Single,
    /// Steps run on a dedicated worker thread
    Dual,
}

/// Worker step protocol state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepState {
    /// No step pending; `signal` is accepted
    Idle,
    /// A step was requested but the worker has not picked it up yet
    Requested,
    /// The worker is inside a step
    Running,
    /// Shutdown requested
    Terminating,
    /// The worker has exited its loop
    Stopped,
}

struct StepSync {
    state: Mutex<StepState>,
    step_requested: Condvar,
    step_done: Condvar,
}

/// Drives physics steps either inline or on a worker thread
pub struct PhysicsScheduler {
    simulation: SharedSimulation,
    mode: SchedulerMode,
    sync: Arc<StepSync>,
    worker: Option<JoinHandle<()>>,
}

impl PhysicsScheduler {
    pub fn new(simulation: SharedSimulation, mode: SchedulerMode) -> Self {
        let sync = Arc::new(StepSync {
            state: Mutex::new(StepState::Idle),
            step_requested: Condvar::new(),
            step_done: Condvar::new(),
        });

        let worker = match mode {
            SchedulerMode::Single => None,
            SchedulerMode::Dual => {
                let sim = simulation.clone();
                let sync = Arc::clone(&sync);
                Some(
                    thread::Builder::new()
                        .name("physics".into())
                        .spawn(move || worker_loop(sim, sync))
                        .unwrap_or_else(|e| {
                            // Thread spawn failing this early means the
                            // process is in no state to continue
                            panic!("failed to spawn physics thread: {}", e)
                        }),
                )
            }
        };

        log::info!("physics scheduler started in {:?} mode", mode);
        Self {
            simulation,
            mode,
            sync,
            worker,
        }
    }

    pub fn mode(&self) -> SchedulerMode {
        self.mode
    }

    /// Request one physics step
    ///
    /// In dual mode the request is dropped unless the worker is idle, so a
    /// frame can never queue up more than one outstanding step. No-op in
    /// single mode, where `wait` does the stepping.
    pub fn signal(&self) {
        match self.mode {
            SchedulerMode::Single => {}
            SchedulerMode::Dual => {
                let mut state = self
                    .sync
                    .state
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                if *state == StepState::Idle {
                    *state = StepState::Requested;
                    self.sync.step_requested.notify_one();
                }
            }
        }
    }

    /// Block until no step is pending or in flight
    ///
    /// Once this returns, the simulation can be refreshed without racing
    /// the worker. In single mode this runs one step synchronously, so
    /// the refresh that follows sees the freshest transforms.
    pub fn wait(&self) {
        if self.mode == SchedulerMode::Single {
            self.simulation.lock().step();
            return;
        }
        let mut state = self
            .sync
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        while matches!(*state, StepState::Requested | StepState::Running) {
            state = self
                .sync
                .step_done
                .wait(state)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    /// Stop the worker thread
    ///
    /// Waits a bounded time for the worker to acknowledge; if it does not
    /// (a step wedged on a poisoned lock, say) the thread is detached so
    /// shutdown cannot hang the process.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };

        {
            let mut state = self
                .sync
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if *state != StepState::Stopped {
                *state = StepState::Terminating;
                self.sync.step_requested.notify_one();

                let deadline = Duration::from_millis(100);
                let (new_state, timeout) = self
                    .sync
                    .step_done
                    .wait_timeout_while(state, deadline, |s| *s != StepState::Stopped)
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                state = new_state;
                if timeout.timed_out() && *state != StepState::Stopped {
                    log::warn!("physics thread did not stop in time, detaching");
                    return;
                }
            }
        }

        if handle.join().is_err() {
            log::warn!("physics thread panicked during shutdown");
        }
    }
}

impl Drop for PhysicsScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(simulation: SharedSimulation, sync: Arc<StepSync>) {
    loop {
        {
            let mut state = sync
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            loop {
                match *state {
                    StepState::Requested => {
                        *state = StepState::Running;
                        break;
                    }
                    StepState::Terminating => {
                        *state = StepState::Stopped;
                        sync.step_done.notify_all();
                        return;
                    }
                    _ => {
                        state = sync
                            .step_requested
                            .wait(state)
                            .unwrap_or_else(std::sync::PoisonError::into_inner);
                    }
                }
            }
        }

        // State lock released while stepping: signal() stays cheap and the
        // frame loop blocks only in wait()
        simulation.lock().step();

        let mut state = sync
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *state == StepState::Terminating {
            *state = StepState::Stopped;
            sync.step_done.notify_all();
            return;
        }
        *state = StepState::Idle;
        sync.step_done.notify_all();
    }
}
