//! In-process call recording
//!
//! The emission side: wraps calls between actors and records them as
//! [`CallRecord`]s with ids from an injected [`CallIdGenerator`]. Share one
//! generator between recorders (or threads) to keep a single call order.
//!
//! ```
//! use callflow::core::{CallIdGenerator, Container};
//! use callflow::plugins::recorder::Recorder;
//!
//! let recorder = Recorder::new(CallIdGenerator::new());
//! let ui = Container::person("app", "user");
//! let api = Container::system("app", "api");
//!
//! let answer: Result<u32, String> =
//!     recorder.traced(&ui, &api, "answer", vec![], || Ok(42));
//! assert_eq!(answer, Ok(42));
//! assert_eq!(recorder.snapshot()[0].response_id, Some(2));
//! ```

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::core::{CallIdGenerator, CallRecord, Container, Outcome, Timestamp, Trace};

/// Records calls as they happen
#[derive(Debug)]
pub struct Recorder {
    ids: CallIdGenerator,
    epoch: Instant,
    calls: Mutex<Vec<CallRecord>>,
}

/// A started call that has not ended yet
///
/// Dropping it without calling [`complete`](Self::complete) or
/// [`fail`](Self::fail) leaves the call pending.
#[must_use = "a call stays pending until completed or failed"]
pub struct OpenCall<'a> {
    recorder: &'a Recorder,
    call_id: u64,
}

impl Recorder {
    pub fn new(ids: CallIdGenerator) -> Self {
        Self {
            ids,
            epoch: Instant::now(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The generator this recorder draws ids from
    pub fn ids(&self) -> &CallIdGenerator {
        &self.ids
    }

    fn now(&self) -> Timestamp {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CallRecord>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the start of a call
    pub fn begin(
        &self,
        source: &Container,
        target: &Container,
        operation: impl Into<String>,
        inputs: Vec<Value>,
    ) -> OpenCall<'_> {
        let start_time = self.now();
        let call_id = self.ids.next_id();
        let record = CallRecord::new(call_id, source.clone(), target.clone(), operation, start_time)
            .with_inputs(inputs);
        trace!(call_id, operation = %record.operation, "Call started");

        self.lock().push(record);
        OpenCall {
            recorder: self,
            call_id,
        }
    }

    /// Run `f` as a call from `source` to `target` and record its outcome
    pub fn traced<T, E, F>(
        &self,
        source: &Container,
        target: &Container,
        operation: &str,
        inputs: Vec<Value>,
        f: F,
    ) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        let call = self.begin(source, target, operation, inputs);
        let result = f();
        match &result {
            Ok(value) => {
                let value = serde_json::to_value(value).unwrap_or_else(|e| {
                    warn!(error = %e, operation, "Result is not serializable");
                    Value::Null
                });
                call.complete(value);
            }
            Err(error) => call.fail(error.to_string()),
        }
        result
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Vec<CallRecord> {
        self.lock().clone()
    }

    /// Snapshot as a trace ready for rendering
    pub fn trace(&self) -> Trace {
        Trace::new(self.snapshot())
    }

    /// Snapshot in the native JSON format
    pub fn to_json(&self) -> Result<String> {
        super::native::to_json(&self.snapshot())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget recorded calls; the id generator keeps counting
    ///
    /// Calls still open are forgotten too and ending them records nothing.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn finish(&self, call_id: u64, outcome: impl FnOnce(Timestamp) -> Outcome) {
        let time = self.now();
        let response_id = self.ids.next_id();
        let mut calls = self.lock();
        // Open calls sit near the end
        match calls.iter_mut().rev().find(|record| record.call_id == call_id) {
            Some(record) => {
                record.response_id = Some(response_id);
                record.outcome = outcome(time);
                trace!(call_id, response_id, "Call finished");
            }
            None => debug!(call_id, "Finished call is no longer recorded"),
        }
    }
}

impl OpenCall<'_> {
    pub fn call_id(&self) -> u64 {
        self.call_id
    }

    pub fn complete(self, result: impl Into<Value>) {
        let result = result.into();
        self.recorder
            .finish(self.call_id, |time| Outcome::Completed { time, result });
    }

    pub fn fail(self, error: impl Into<String>) {
        let error = error.into();
        self.recorder
            .finish(self.call_id, |time| Outcome::Failed { time, error });
    }
}
