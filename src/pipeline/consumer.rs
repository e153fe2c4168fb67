//! Consumer task
//!
//! Pops messages until the queue stays empty for a full drain timeout,
//! simulating work on each one. The drain timeout is the only
//! end-of-stream signal: there is no close marker.

use crate::core::cancel::{CancellationToken, Suspend};
use crate::pipeline::error::PipelineResult;
use crate::pipeline::observer::PipelineObserver;
use crate::pipeline::outcome::TaskOutcome;
use crate::pipeline::settings::PipelineSettings;
use crate::queue::{BlockingQueue, Pop};
use std::sync::Arc;
use std::time::Duration;

pub struct Consumer {
    queue: Arc<BlockingQueue>,
    drain_timeout: Duration,
    process_delay: Duration,
    poll_interval: Duration,
    token: CancellationToken,
    observer: Arc<dyn PipelineObserver>,
}

impl Consumer {
    pub fn new(
        queue: Arc<BlockingQueue>,
        settings: &PipelineSettings,
        token: CancellationToken,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        Self {
            queue,
            drain_timeout: settings.drain_timeout,
            process_delay: settings.process_delay,
            poll_interval: settings.poll_interval,
            token,
            observer,
        }
    }

    /// Run until the queue drains or the token fires, on the calling thread
    pub fn run(self) -> PipelineResult<TaskOutcome> {
        let mut handled = 0;

        loop {
            let pop = self
                .queue
                .pop_or_cancel(self.drain_timeout, &self.token, self.poll_interval)?;

            match pop {
                Pop::Message(message) => {
                    handled += 1;
                    self.observer.on_consumed(&message);

                    if self.token.sleep(self.process_delay) == Suspend::Cancelled {
                        return self.cancelled(handled);
                    }
                }
                Pop::TimedOut => {
                    log::debug!(
                        "consumer: no message for {:?}, drained after {} messages",
                        self.drain_timeout,
                        handled
                    );
                    return Ok(TaskOutcome::Completed { handled });
                }
                Pop::Cancelled => return self.cancelled(handled),
            }
        }
    }

    fn cancelled(&self, handled: usize) -> PipelineResult<TaskOutcome> {
        let remaining = self.queue.len()?;
        log::info!(
            "consumer: cancelled after {} messages ({} left in queue)",
            handled,
            remaining
        );
        Ok(TaskOutcome::Cancelled { handled, remaining })
    }
}
