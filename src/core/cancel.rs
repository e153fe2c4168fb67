//! Cooperative Cancellation
//!
//! Worker threads receive a [`CancellationToken`] when they are spawned and
//! check it at every suspension point. Cancelling a token wakes any thread
//! currently sleeping on it and cascades to every child token derived from
//! it. OS signals are bridged onto a root token by [`install_signal_handlers`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Result of a cancellable suspension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspend {
    /// The full duration passed without cancellation
    Elapsed,
    /// The token fired before the duration passed
    Cancelled,
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    // Guards nothing but the condvar handshake
    lock: Mutex<()>,
    wakeup: Condvar,
    children: Mutex<Vec<CancellationToken>>,
}

/// Cooperative cancellation signal with no payload
///
/// Clones share state: cancelling any clone cancels them all. Child tokens
/// are cancelled with their parent but can also be cancelled on their own
/// without affecting the parent or siblings.
///
/// # Example
///
/// ```rust
/// use drainq::core::cancel::{CancellationToken, Suspend};
/// use std::time::Duration;
///
/// let root = CancellationToken::new();
/// let worker = root.child_token();
///
/// root.cancel();
/// assert!(worker.is_cancelled());
/// assert_eq!(worker.sleep(Duration::from_secs(60)), Suspend::Cancelled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a token that is cancelled whenever this one is
    pub fn child_token(&self) -> Self {
        let child = Self::new();
        if self.is_cancelled() {
            child.cancel();
            return child;
        }

        self.state
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(child.clone());

        // cancel() may have drained the child list between the check and the push
        if self.is_cancelled() {
            child.cancel();
        }
        child
    }

    /// Request cancellation and wake every thread sleeping on this token
    pub fn cancel(&self) {
        if self.state.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        {
            let _guard = self
                .state
                .lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.state.wakeup.notify_all();
        }

        let children = std::mem::take(
            &mut *self
                .state
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for child in children {
            child.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Suspend the calling thread for `duration` unless cancelled first
    ///
    /// A zero duration only checks the token.
    pub fn sleep(&self, duration: Duration) -> Suspend {
        let deadline = Instant::now().checked_add(duration);
        let mut guard = self
            .state
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        loop {
            if self.is_cancelled() {
                return Suspend::Cancelled;
            }

            guard = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Suspend::Elapsed;
                    }
                    self.state
                        .wakeup
                        .wait_timeout(guard, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .state
                    .wakeup
                    .wait(guard)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}

/// Bridge OS termination signals onto `token`
///
/// The first signal cancels the token so running tasks wind down and report
/// what they left behind; a second signal exits immediately with status 130.
/// Must be called from within a tokio runtime.
pub fn install_signal_handlers(token: &CancellationToken) {
    let signal_count = Arc::new(AtomicUsize::new(0));

    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use tokio::signal::unix::{signal, SignalKind};
        let signals = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in signals {
            let token = token.clone();
            let sig_ctr = signal_count.clone();

            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        on_signal(&token, &sig_ctr);
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        let token = token.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                on_signal(&token, &signal_count);
            }
        });
    }
}

fn on_signal(token: &CancellationToken, signal_count: &AtomicUsize) {
    let prev = signal_count.fetch_add(1, Ordering::AcqRel);
    if prev >= 1 {
        log::warn!("Second termination signal received; exiting");
        std::process::exit(130);
    }
    log::warn!("Termination signal received; cancelling tasks");
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_token_starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();

        clone.cancel();

        assert!(token.is_cancelled());
        // Repeated cancel is a no-op
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_sleep_elapses_without_cancellation() {
        let token = CancellationToken::new();
        let start = Instant::now();

        assert_eq!(token.sleep(Duration::from_millis(20)), Suspend::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_zero_sleep_only_checks_token() {
        let token = CancellationToken::new();
        assert_eq!(token.sleep(Duration::ZERO), Suspend::Elapsed);

        token.cancel();
        assert_eq!(token.sleep(Duration::ZERO), Suspend::Cancelled);
    }

    #[test]
    fn test_cancel_wakes_sleeping_thread_promptly() {
        let token = CancellationToken::new();
        let sleeper_token = token.clone();

        let sleeper = thread::spawn(move || {
            let start = Instant::now();
            let result = sleeper_token.sleep(Duration::from_secs(30));
            (result, start.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        token.cancel();

        let (result, waited) = sleeper.join().unwrap();
        assert_eq!(result, Suspend::Cancelled);
        assert!(
            waited < Duration::from_secs(5),
            "sleep should end soon after cancel, waited {:?}",
            waited
        );
    }

    #[test]
    fn test_parent_cancels_children() {
        let root = CancellationToken::new();
        let producer = root.child_token();
        let consumer = root.child_token();
        let grandchild = consumer.child_token();

        root.cancel();

        assert!(producer.is_cancelled());
        assert!(consumer.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent_or_siblings() {
        let root = CancellationToken::new();
        let producer = root.child_token();
        let consumer = root.child_token();

        consumer.cancel();

        assert!(consumer.is_cancelled());
        assert!(!producer.is_cancelled());
        assert!(!root.is_cancelled());
    }

    #[test]
    fn test_child_of_cancelled_parent_starts_cancelled() {
        let root = CancellationToken::new();
        root.cancel();

        let late = root.child_token();
        assert!(late.is_cancelled());
    }

    #[tokio::test]
    async fn test_install_signal_handlers_leaves_token_alone() {
        let token = CancellationToken::new();
        install_signal_handlers(&token);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!token.is_cancelled());
    }
}
