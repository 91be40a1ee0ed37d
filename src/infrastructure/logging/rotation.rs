//! Day-boundary rotation controller
//!
//! Every emission asks the controller whether the calendar day has moved past
//! the day of the last rotation. The comparison runs under one exclusive lock;
//! when a new day is seen the rotation itself is submitted to the blocking
//! pool and the caller continues without waiting for the file I/O.
//!
//! State rules:
//! - `last_rotation_day` only moves forward, and only after a rotation succeeds
//! - while a rotation is in flight no other is submitted, so a day triggers at
//!   most one rotation
//! - a failed rotation clears `in_flight` and leaves the day untouched, so the
//!   next emission retries

use chrono::NaiveDate;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::errors::LogError;
use crate::domain::ports::DayRotator;

/// Snapshot of the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationState {
    /// Day of the last successful rotation.
    pub last_rotation_day: NaiveDate,
    /// A rotation is currently running.
    pub in_flight: bool,
}

/// Serializes day-boundary checks and submits rotations in the background.
pub struct RotationController {
    state: Arc<Mutex<RotationState>>,
    rotator: Arc<dyn DayRotator>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl RotationController {
    /// Controller whose last rotation is considered to have happened on `today`.
    pub fn new(rotator: Arc<dyn DayRotator>, today: NaiveDate) -> Self {
        Self {
            state: Arc::new(Mutex::new(RotationState {
                last_rotation_day: today,
                in_flight: false,
            })),
            rotator,
            pending: Mutex::new(None),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RotationState {
        *lock(&self.state)
    }

    /// Day of the last successful rotation.
    pub fn last_rotation_day(&self) -> NaiveDate {
        self.state().last_rotation_day
    }

    /// Compare `today` with the last rotation day and submit a rotation if the
    /// day has advanced. Returns whether a rotation was submitted.
    pub fn check(&self, today: NaiveDate) -> bool {
        {
            let mut state = lock(&self.state);
            if state.in_flight || today <= state.last_rotation_day {
                return false;
            }
            state.in_flight = true;
        }

        let task = RotationTask {
            state: Arc::clone(&self.state),
            rotator: Arc::clone(&self.rotator),
            target: today,
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let join = handle.spawn_blocking(move || task.run());
                *lock(&self.pending) = Some(join);
            }
            Err(_) => task.run(),
        }
        true
    }

    /// Wait for the most recently submitted rotation to finish.
    pub async fn settle(&self) {
        let pending = lock(&self.pending).take();
        if let Some(join) = pending {
            if let Err(e) = join.await {
                warn!(error = %e, "daily log rotation task did not complete");
            }
        }
    }

    /// Rotate immediately on the calling thread, regardless of the day.
    ///
    /// Fails without rotating while another rotation is in flight.
    pub fn force(&self, today: NaiveDate) -> Result<(), LogError> {
        {
            let mut state = lock(&self.state);
            if state.in_flight {
                return Err(LogError::Rotation(
                    "a log rotation is already in progress".to_string(),
                ));
            }
            state.in_flight = true;
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| self.rotator.rotate()))
            .unwrap_or_else(|_| Err(LogError::Rotation("rotator panicked".to_string())));

        let mut state = lock(&self.state);
        state.in_flight = false;
        outcome?;
        if today > state.last_rotation_day {
            state.last_rotation_day = today;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RotationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationController")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

struct RotationTask {
    state: Arc<Mutex<RotationState>>,
    rotator: Arc<dyn DayRotator>,
    target: NaiveDate,
}

impl RotationTask {
    fn run(self) {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.rotator.rotate()))
            .unwrap_or_else(|_| Err(LogError::Rotation("rotator panicked".to_string())));

        let mut state = lock(&self.state);
        state.in_flight = false;
        match outcome {
            Ok(()) => {
                if self.target > state.last_rotation_day {
                    state.last_rotation_day = self.target;
                }
                info!(day = %self.target, "daily log rotation complete");
            }
            Err(e) => {
                warn!(day = %self.target, error = %e, "daily log rotation failed, will retry");
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
