//! Scenario orchestration
//!
//! Start the producer, start the consumer, join the producer without a
//! bound, join the consumer with one, then look at the queue.

use crate::core::cancel::CancellationToken;
use crate::pipeline::consumer::Consumer;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::observer::{ConsoleObserver, PipelineObserver};
use crate::pipeline::outcome::{PipelineReport, TaskRole};
use crate::pipeline::producer::Producer;
use crate::pipeline::settings::PipelineSettings;
use crate::queue::BlockingQueue;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// One producer, one consumer, one shared queue
///
/// Each task gets its own child of the pipeline's root token, so either
/// can be cancelled alone, or both through [`cancel`](Self::cancel).
///
/// # Example
///
/// ```rust,no_run
/// use drainq::pipeline::{Pipeline, PipelineSettings, SilentObserver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = PipelineSettings {
///     message_count: 10,
///     produce_interval: Duration::from_millis(5),
///     process_delay: Duration::from_millis(1),
///     drain_timeout: Duration::from_millis(100),
///     ..Default::default()
/// };
///
/// let report = Pipeline::new(settings)?
///     .with_observer(Arc::new(SilentObserver))
///     .run()?;
/// assert!(report.is_drained());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    settings: PipelineSettings,
    queue: Arc<BlockingQueue>,
    observer: Arc<dyn PipelineObserver>,
    root: CancellationToken,
    producer_token: CancellationToken,
    consumer_token: CancellationToken,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings) -> PipelineResult<Self> {
        settings.validate()?;

        let root = CancellationToken::new();
        Ok(Self {
            queue: Arc::new(BlockingQueue::new(format!(
                "{}-requests",
                settings.producer_id
            ))),
            settings,
            observer: Arc::new(ConsoleObserver),
            producer_token: root.child_token(),
            consumer_token: root.child_token(),
            root,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Derive the task tokens from `root` instead of a private one
    pub fn with_cancellation(mut self, root: CancellationToken) -> Self {
        self.producer_token = root.child_token();
        self.consumer_token = root.child_token();
        self.root = root;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn queue(&self) -> Arc<BlockingQueue> {
        Arc::clone(&self.queue)
    }

    pub fn producer_token(&self) -> CancellationToken {
        self.producer_token.clone()
    }

    pub fn consumer_token(&self) -> CancellationToken {
        self.consumer_token.clone()
    }

    /// Cancel both tasks
    pub fn cancel(&self) {
        self.root.cancel();
    }

    /// Run the scenario on two new threads and block until it settles
    ///
    /// An expired consumer join is reported, not raised: the report's
    /// `remaining_in_queue` is what decides whether the run drained.
    pub fn run(&self) -> PipelineResult<PipelineReport> {
        let start = Instant::now();
        let settings = &self.settings;

        log::info!(
            "Starting scenario: {} messages, produce every {:?}, process {:?}, drain after {:?}",
            settings.message_count,
            settings.produce_interval,
            settings.process_delay,
            settings.drain_timeout
        );
        if !settings.join_timeout_is_sufficient() {
            log::warn!(
                "Consumer join timeout {:?} is below the estimated consumer tail {:?}; the queue may not drain in time",
                settings.join_timeout,
                settings.estimated_consumer_tail()
            );
        }

        let producer = Producer::new(
            self.queue(),
            settings,
            self.producer_token(),
            Arc::clone(&self.observer),
        );
        let producer_handle = spawn_worker(TaskRole::Producer, move || producer.run())?;

        let consumer = Consumer::new(
            self.queue(),
            settings,
            self.consumer_token(),
            Arc::clone(&self.observer),
        );
        let (done_tx, done_rx) = mpsc::channel();
        let consumer_handle = match spawn_worker(TaskRole::Consumer, move || {
            let _ = done_tx.send(consumer.run());
        }) {
            Ok(handle) => handle,
            Err(err) => {
                self.producer_token.cancel();
                let _ = producer_handle.join();
                return Err(err);
            }
        };

        let producer_outcome = match join_worker(TaskRole::Producer, producer_handle)
            .and_then(|result| result)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                self.consumer_token.cancel();
                return Err(err);
            }
        };
        log::debug!("Producer joined: {:?}", producer_outcome);

        let (consumer_outcome, consumer_join_timed_out) =
            match done_rx.recv_timeout(settings.join_timeout) {
                Ok(result) => {
                    join_worker(TaskRole::Consumer, consumer_handle)?;
                    (Some(result?), false)
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "Consumer did not finish within {:?}",
                        settings.join_timeout
                    );
                    if settings.cancel_on_join_timeout {
                        self.consumer_token.cancel();
                        let result = done_rx
                            .recv()
                            .map_err(|_| PipelineError::WorkerPanicked {
                                role: TaskRole::Consumer,
                            })?;
                        join_worker(TaskRole::Consumer, consumer_handle)?;
                        (Some(result?), true)
                    } else {
                        (None, true)
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // The sender only drops without sending if run() panicked
                    let _ = consumer_handle.join();
                    return Err(PipelineError::WorkerPanicked {
                        role: TaskRole::Consumer,
                    });
                }
            };
        log::debug!("Consumer joined: {:?}", consumer_outcome);

        let report = PipelineReport {
            producer: producer_outcome,
            consumer: consumer_outcome,
            consumer_join_timed_out,
            remaining_in_queue: self.queue.len()?,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        if report.is_drained() {
            log::info!("Scenario finished with an empty queue");
        } else {
            log::warn!(
                "Scenario finished with {} messages left in the queue",
                report.remaining_in_queue
            );
        }
        Ok(report)
    }
}

fn spawn_worker<F, T>(role: TaskRole, body: F) -> PipelineResult<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(format!("drainq-{}", role))
        .spawn(body)
        .map_err(|source| PipelineError::Spawn { role, source })
}

fn join_worker<T>(role: TaskRole, handle: JoinHandle<T>) -> PipelineResult<T> {
    handle
        .join()
        .map_err(|_| PipelineError::WorkerPanicked { role })
}

/// Run one scenario with `settings`, printing messages to stdout
pub fn run_scenario(settings: PipelineSettings) -> PipelineResult<PipelineReport> {
    Pipeline::new(settings)?.run()
}
