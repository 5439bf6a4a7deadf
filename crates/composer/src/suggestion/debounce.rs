// Copyright 2026 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A deadline owned by the composer and driven by `poll(now)`. No
//! threads, no timer callbacks: the deadline is plain data and dies with
//! its owner.

use std::time::{Duration, Instant};

pub(crate) struct Debouncer {
    period: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Start (or restart) the countdown from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    /// True once per elapsed deadline; clears it.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
