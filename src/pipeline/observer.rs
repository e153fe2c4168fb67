//! Observation hooks for produced and consumed messages

use crate::queue::Message;
use std::sync::{Mutex, PoisonError};

/// Receives a callback for every message the tasks move through the queue
///
/// Called on the producer and consumer threads, so implementations must be
/// cheap and thread-safe. `on_consumed` runs before the simulated
/// processing delay.
pub trait PipelineObserver: Send + Sync {
    fn on_produced(&self, message: &Message);

    fn on_consumed(&self, message: &Message);
}

/// Prints `Produced: <payload>` / `Consumed: <payload>` lines to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_produced(&self, message: &Message) {
        println!("Produced: {}", message);
    }

    fn on_consumed(&self, message: &Message) {
        println!("Consumed: {}", message);
    }
}

/// Discards all notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {
    fn on_produced(&self, _message: &Message) {}

    fn on_consumed(&self, _message: &Message) {}
}

/// Keeps every payload in the order it was seen
#[derive(Debug, Default)]
pub struct RecordingObserver {
    produced: Mutex<Vec<String>>,
    consumed: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn produced(&self) -> Vec<String> {
        self.produced
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn consumed(&self) -> Vec<String> {
        self.consumed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_produced(&self, message: &Message) {
        self.produced
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.data.clone());
    }

    fn on_consumed(&self, message: &Message) {
        self.consumed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.data.clone());
    }
}
