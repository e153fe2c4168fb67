//! Internal BlockingQueue implementation
//!
//! An unbounded FIFO guarded by a single mutex, with a condvar that wakes
//! waiting consumers on push. Pushing never waits on capacity; the only
//! blocking on that side is the transient lock acquisition.

use crate::core::cancel::CancellationToken;
use crate::core::sync::handle_mutex_poison;
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::message::Message;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Outcome of a cancellable pop
#[derive(Debug)]
pub enum Pop {
    /// The oldest message in the queue
    Message(Message),
    /// Nothing arrived within the timeout
    TimedOut,
    /// The token fired while waiting
    Cancelled,
}

#[derive(Debug)]
struct QueueState {
    next_sequence: u64,
    messages: VecDeque<Message>,
}

/// Thread-safe unbounded FIFO with poll-with-timeout retrieval
///
/// Shared between exactly one producer and one consumer through `Arc`.
#[derive(Debug)]
pub struct BlockingQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    queue_id: String,
}

impl BlockingQueue {
    pub fn new(queue_id: String) -> Self {
        Self {
            state: Mutex::new(QueueState {
                next_sequence: 1,
                messages: VecDeque::new(),
            }),
            available: Condvar::new(),
            queue_id,
        }
    }

    pub fn queue_id(&self) -> &str {
        &self.queue_id
    }

    fn lock(&self) -> QueueResult<MutexGuard<'_, QueueState>> {
        handle_mutex_poison(self.state.lock(), |message| QueueError::Poisoned {
            message,
        })
    }

    fn wait<'a>(
        &'a self,
        guard: MutexGuard<'a, QueueState>,
        timeout: Duration,
    ) -> QueueResult<MutexGuard<'a, QueueState>> {
        let (guard, _) = handle_mutex_poison(
            self.available.wait_timeout(guard, timeout),
            |message| QueueError::Poisoned { message },
        )?;
        Ok(guard)
    }

    /// Append a message, assigning it the next sequence number
    pub fn push(&self, mut message: Message) -> QueueResult<u64> {
        let sequence = {
            let mut state = self.lock()?;
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            message.header.sequence = sequence;
            state.messages.push_back(message);
            sequence
        };

        self.available.notify_one();
        log::trace!("queue '{}': pushed sequence {}", self.queue_id, sequence);
        Ok(sequence)
    }

    /// Remove the oldest message without waiting
    pub fn try_pop(&self) -> QueueResult<Option<Message>> {
        Ok(self.lock()?.messages.pop_front())
    }

    /// Remove the oldest message, waiting up to `timeout` for one to arrive
    pub fn pop_timeout(&self, timeout: Duration) -> QueueResult<Option<Message>> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.lock()?;

        loop {
            if let Some(message) = state.messages.pop_front() {
                return Ok(Some(message));
            }

            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => Duration::MAX,
            };
            if remaining.is_zero() {
                return Ok(None);
            }
            state = self.wait(state, remaining)?;
        }
    }

    /// Like [`pop_timeout`](Self::pop_timeout), but gives up early once `token` is cancelled
    ///
    /// The token is checked before every wait and at least every
    /// `poll_interval` while waiting. A zero `poll_interval` only checks the
    /// token between arrivals.
    pub fn pop_or_cancel(
        &self,
        timeout: Duration,
        token: &CancellationToken,
        poll_interval: Duration,
    ) -> QueueResult<Pop> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.lock()?;

        loop {
            if token.is_cancelled() {
                return Ok(Pop::Cancelled);
            }
            if let Some(message) = state.messages.pop_front() {
                return Ok(Pop::Message(message));
            }

            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => Duration::MAX,
            };
            if remaining.is_zero() {
                return Ok(Pop::TimedOut);
            }

            let slice = if poll_interval.is_zero() {
                remaining
            } else {
                remaining.min(poll_interval)
            };
            state = self.wait(state, slice)?;
        }
    }

    /// Number of messages waiting
    pub fn len(&self) -> QueueResult<usize> {
        Ok(self.lock()?.messages.len())
    }

    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.lock()?.messages.is_empty())
    }

    /// The sequence number the next push will receive
    pub fn head_sequence(&self) -> QueueResult<u64> {
        Ok(self.lock()?.next_sequence)
    }

    /// Copy of the waiting payloads, oldest first
    pub fn snapshot(&self) -> QueueResult<Vec<String>> {
        Ok(self
            .lock()?
            .messages
            .iter()
            .map(|message| message.data.clone())
            .collect())
    }

    /// Run `f` while holding the state lock
    #[cfg(test)]
    pub(crate) fn with_locked_for_test(&self, f: impl FnOnce()) {
        let _guard = self.state.lock();
        f();
    }
}
