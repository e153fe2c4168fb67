//! Shared Blocking Queue
//!
//! The single piece of shared mutable state between the producer and the
//! consumer. All synchronisation lives here; the tasks on either side add
//! no locking of their own.
//!
//! # Overview
//!
//! - **Unbounded**: `push` never waits for capacity
//! - **FIFO**: messages come out in the order they went in
//! - **Poll with timeout**: `pop_timeout` returns `None` when nothing
//!   arrives in time, which is how the consumer detects a drained queue
//! - **Cancellable waits**: `pop_or_cancel` also returns as soon as a
//!   [`CancellationToken`](crate::core::cancel::CancellationToken) fires
//!
//! ```text
//! ┌──────────┐  push   ┌───┬───┬───┬───┐  pop_timeout  ┌──────────┐
//! │ Producer │ ──────► │ 4 │ 3 │ 2 │ 1 │ ────────────► │ Consumer │
//! └──────────┘         └───┴───┴───┴───┘               └──────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use drainq::queue::{BlockingQueue, Message};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = Arc::new(BlockingQueue::new("requests".to_string()));
//!
//! queue.push(Message::request("producer".to_string(), 1))?;
//!
//! let message = queue.pop_timeout(Duration::from_millis(10))?;
//! assert_eq!(message.map(|m| m.data), Some("Request 1".to_string()));
//! assert!(queue.pop_timeout(Duration::from_millis(10))?.is_none());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod error;
mod internal;
mod message;

pub use error::{QueueError, QueueResult};
pub use internal::{BlockingQueue, Pop};
pub use message::{Message, MessageHeader};

#[cfg(test)]
mod tests;
