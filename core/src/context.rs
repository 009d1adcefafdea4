// MRT
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

//! Request-scoped context.
//!
//! A `Context` is created by the REST layer for every incoming request and is passed explicitly
//! to the driver and database layers.  It bounds how long the database layer may wait for the
//! backend on behalf of the request.  Cancellation on client disconnect comes for free: the
//! server drops the request future, which drops any pending database call with it.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Error returned when an operation does not complete before the context's deadline.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Deadline exceeded")]
pub struct DeadlineExceeded;

/// Deadline carried by a request through all layers of the service.
#[derive(Clone, Copy, Debug)]
pub struct Context {
    /// Time after which pending operations are abandoned, if any.
    deadline: Option<Instant>,
}

impl Context {
    /// Creates a context without a deadline.
    pub fn background() -> Self {
        Self { deadline: None }
    }

    /// Creates a context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { deadline: Some(Instant::now() + timeout) }
    }

    /// Returns the deadline of this context, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Awaits `fut` but gives up once the deadline is reached.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        match self.deadline {
            None => Ok(fut.await),
            Some(deadline) => {
                tokio::time::timeout_at(deadline, fut).await.map_err(|_| DeadlineExceeded)
            }
        }
    }
}
