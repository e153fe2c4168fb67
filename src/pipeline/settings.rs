//! Scenario settings
//!
//! Every delay and bound the tasks use lives here rather than in the task
//! bodies, since together they decide whether the bounded consumer join is
//! long enough.

use crate::pipeline::error::{PipelineError, PipelineResult};
use std::time::Duration;

pub const DEFAULT_MESSAGE_COUNT: usize = 100;
pub const DEFAULT_PRODUCE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_PROCESS_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_PRODUCER_ID: &str = "producer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Messages the producer emits
    pub message_count: usize,
    /// Pause after each push
    pub produce_interval: Duration,
    /// Simulated work per consumed message
    pub process_delay: Duration,
    /// Idle time after which the consumer treats the queue as drained
    pub drain_timeout: Duration,
    /// Bound on waiting for the consumer once the producer has finished
    pub join_timeout: Duration,
    /// Longest the consumer waits on the queue before re-checking its token
    pub poll_interval: Duration,
    /// Cancel the consumer when its join expires instead of leaving it running
    pub cancel_on_join_timeout: bool,
    pub producer_id: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            message_count: DEFAULT_MESSAGE_COUNT,
            produce_interval: DEFAULT_PRODUCE_INTERVAL,
            process_delay: DEFAULT_PROCESS_DELAY,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel_on_join_timeout: false,
            producer_id: DEFAULT_PRODUCER_ID.to_string(),
        }
    }
}

impl PipelineSettings {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.drain_timeout.is_zero() {
            return Err(PipelineError::InvalidSettings {
                message: "drain timeout must be greater than zero".to_string(),
            });
        }
        if self.producer_id.trim().is_empty() {
            return Err(PipelineError::InvalidSettings {
                message: "producer id cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Rough lower bound on how long the consumer needs after the producer finishes
    ///
    /// Assumes the consumer is the bottleneck: the backlog left when the
    /// producer stops, times the processing delay, plus one drain timeout.
    pub fn estimated_consumer_tail(&self) -> Duration {
        let produce_total = self.produce_interval.saturating_mul(self.message_count as u32);
        let process_total = self.process_delay.saturating_mul(self.message_count as u32);
        process_total.saturating_sub(produce_total) + self.drain_timeout
    }

    /// Whether the consumer join bound is expected to cover the consumer's tail
    pub fn join_timeout_is_sufficient(&self) -> bool {
        self.join_timeout >= self.estimated_consumer_tail()
    }
}
