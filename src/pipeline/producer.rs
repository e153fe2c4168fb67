//! Producer task
//!
//! Pushes `Request 1` .. `Request N` onto the queue, pausing after each
//! push. The push always happens before the pause, so cancellation can
//! never leave a message half-produced.

use crate::core::cancel::{CancellationToken, Suspend};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::observer::PipelineObserver;
use crate::pipeline::outcome::TaskOutcome;
use crate::pipeline::settings::PipelineSettings;
use crate::queue::{BlockingQueue, Message};
use std::sync::Arc;
use std::time::Duration;

pub struct Producer {
    queue: Arc<BlockingQueue>,
    producer_id: String,
    count: usize,
    interval: Duration,
    token: CancellationToken,
    observer: Arc<dyn PipelineObserver>,
}

impl Producer {
    pub fn new(
        queue: Arc<BlockingQueue>,
        settings: &PipelineSettings,
        token: CancellationToken,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        Self {
            queue,
            producer_id: settings.producer_id.clone(),
            count: settings.message_count,
            interval: settings.produce_interval,
            token,
            observer,
        }
    }

    /// Run to completion or cancellation on the calling thread
    pub fn run(self) -> PipelineResult<TaskOutcome> {
        log::debug!(
            "{}: producing {} messages every {:?}",
            self.producer_id,
            self.count,
            self.interval
        );

        if self.token.is_cancelled() {
            return Ok(self.cancelled(0));
        }

        for n in 1..=self.count {
            let mut message = Message::request(self.producer_id.clone(), n);
            message.header.sequence = self.queue.push(message.clone())?;
            self.observer.on_produced(&message);

            if self.token.sleep(self.interval) == Suspend::Cancelled {
                return Ok(self.cancelled(n));
            }
        }

        log::debug!("{}: produced all {} messages", self.producer_id, self.count);
        Ok(TaskOutcome::Completed {
            handled: self.count,
        })
    }

    fn cancelled(&self, produced: usize) -> TaskOutcome {
        let remaining = self.count - produced;
        log::info!(
            "{}: cancelled after {} of {} messages ({} not produced)",
            self.producer_id,
            produced,
            self.count,
            remaining
        );
        TaskOutcome::Cancelled {
            handled: produced,
            remaining,
        }
    }
}
