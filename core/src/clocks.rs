// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Sources of the current time.
//!
//! Timestamps handed out by a `Clock` have microsecond resolution because that is the finest
//! resolution that every supported database can store and give back unchanged.

use time::OffsetDateTime;

/// Generic definition of a clock.
pub trait Clock {
    /// Returns the current UTC time, truncated to microseconds.
    fn now_utc(&self) -> OffsetDateTime;
}

/// Drops the sub-microsecond part of `ts`.
pub fn truncate_to_micros(ts: OffsetDateTime) -> OffsetDateTime {
    let micros = ts.nanosecond() / 1000;
    ts.replace_nanosecond(micros * 1000).unwrap_or(ts)
}

/// Clock implementation that uses the system clock.
#[derive(Clone, Default)]
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        truncate_to_micros(OffsetDateTime::now_utc())
    }
}

/// Test utilities.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// A clock that stays still until told otherwise.
    pub struct SettableClock {
        /// The instant returned by `now_utc`.
        now: Mutex<OffsetDateTime>,
    }

    impl SettableClock {
        /// Creates a new clock frozen at `now`.
        pub fn new(now: OffsetDateTime) -> Self {
            Self { now: Mutex::new(truncate_to_micros(now)) }
        }

        /// Moves the clock to `now`, which may be earlier than the current value.
        pub fn set(&self, now: OffsetDateTime) {
            *self.now.lock().unwrap() = truncate_to_micros(now);
        }

        /// Moves the clock forward by `delta`.
        pub fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().unwrap();
            *now = truncate_to_micros(*now + delta);
        }
    }

    impl Clock for SettableClock {
        fn now_utc(&self) -> OffsetDateTime {
            *self.now.lock().unwrap()
        }
    }

}
