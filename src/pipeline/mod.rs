//! Producer/Consumer Pipeline
//!
//! Two threads around one [`BlockingQueue`](crate::queue::BlockingQueue):
//! a producer that emits a fixed number of labelled requests at a fixed
//! pace, and a consumer that works through them until the queue has been
//! idle for a full drain timeout.
//!
//! # Flow
//!
//! ```text
//!   Pipeline::run
//!     ├─ spawn drainq-producer ── push "Request 1..N", pause after each
//!     ├─ spawn drainq-consumer ── pop (drain timeout), process, repeat
//!     ├─ join producer           (unbounded)
//!     ├─ join consumer           (bounded by join timeout)
//!     └─ PipelineReport          (outcomes + messages left in the queue)
//! ```
//!
//! Both tasks take a [`CancellationToken`](crate::core::cancel::CancellationToken)
//! at spawn time and report [`TaskOutcome::Cancelled`] with what they left
//! undone instead of exiting silently.

mod consumer;
mod error;
mod observer;
mod orchestrator;
mod outcome;
mod producer;
mod settings;

pub use consumer::Consumer;
pub use error::{PipelineError, PipelineResult};
pub use observer::{ConsoleObserver, PipelineObserver, RecordingObserver, SilentObserver};
pub use orchestrator::{run_scenario, Pipeline};
pub use outcome::{PipelineReport, TaskOutcome, TaskRole};
pub use producer::Producer;
pub use settings::{
    PipelineSettings, DEFAULT_DRAIN_TIMEOUT, DEFAULT_JOIN_TIMEOUT, DEFAULT_MESSAGE_COUNT,
    DEFAULT_POLL_INTERVAL, DEFAULT_PROCESS_DELAY, DEFAULT_PRODUCER_ID, DEFAULT_PRODUCE_INTERVAL,
};

#[cfg(test)]
mod tests;
