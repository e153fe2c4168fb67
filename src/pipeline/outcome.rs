//! Task outcomes and the end-of-run report

use serde::Serialize;
use strum_macros::Display;

/// Which side of the queue a task works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskRole {
    Producer,
    Consumer,
}

/// How a task ended
///
/// `handled` counts messages pushed (producer) or taken off the queue
/// (consumer). `remaining` is what the task left undone: unproduced
/// messages for the producer, the queue backlog for the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed { handled: usize },
    Cancelled { handled: usize, remaining: usize },
}

impl TaskOutcome {
    pub fn handled(&self) -> usize {
        match self {
            TaskOutcome::Completed { handled } | TaskOutcome::Cancelled { handled, .. } => *handled,
        }
    }

    pub fn remaining(&self) -> usize {
        match self {
            TaskOutcome::Completed { .. } => 0,
            TaskOutcome::Cancelled { remaining, .. } => *remaining,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskOutcome::Cancelled { .. })
    }
}

/// Everything observable at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub producer: TaskOutcome,
    /// `None` when the bounded consumer join expired and the consumer was left running
    pub consumer: Option<TaskOutcome>,
    pub consumer_join_timed_out: bool,
    /// Messages still in the queue when the report was taken
    pub remaining_in_queue: usize,
    pub elapsed_ms: u64,
}

impl PipelineReport {
    /// The queue ended empty
    pub fn is_drained(&self) -> bool {
        self.remaining_in_queue == 0
    }

    /// Either task stopped because of cancellation
    pub fn was_cancelled(&self) -> bool {
        self.producer.is_cancelled() || self.consumer.is_some_and(|c| c.is_cancelled())
    }
}
