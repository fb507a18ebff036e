//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`; only
//! compiled for tests or with the `test-support` feature.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

mod in_memory_directory;

pub use in_memory_directory::InMemoryDirectoryStore;

/// Clock whose current instant is set explicitly by the test.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
