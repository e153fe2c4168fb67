//! Test modules for the producer/consumer pipeline


use crate::core::cancel::CancellationToken;
use crate::pipeline::{PipelineObserver, PipelineSettings, RecordingObserver};
use crate::queue::Message;
use std::time::Duration;

/// Settings that finish in well under a second
pub(super) fn fast_settings(message_count: usize) -> PipelineSettings {
    PipelineSettings {
        message_count,
        produce_interval: Duration::from_millis(1),
        process_delay: Duration::ZERO,
        drain_timeout: Duration::from_millis(200),
        join_timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    }
}

/// Records everything and cancels `token` when `payload` goes by
pub(super) struct CancelOn {
    pub token: CancellationToken,
    pub payload: String,
    pub on_consume: bool,
    pub record: RecordingObserver,
}

impl CancelOn {
    pub fn consumed(token: CancellationToken, payload: &str) -> Self {
        Self {
            token,
            payload: payload.to_string(),
            on_consume: true,
            record: RecordingObserver::new(),
        }
    }

    pub fn produced(token: CancellationToken, payload: &str) -> Self {
        Self {
            on_consume: false,
            ..Self::consumed(token, payload)
        }
    }
}

impl PipelineObserver for CancelOn {
    fn on_produced(&self, message: &Message) {
        self.record.on_produced(message);
        if !self.on_consume && message.data == self.payload {
            self.token.cancel();
        }
    }

    fn on_consumed(&self, message: &Message) {
        self.record.on_consumed(message);
        if self.on_consume && message.data == self.payload {
            self.token.cancel();
        }
    }
}

pub(super) fn requests(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
    range.map(|n| format!("Request {}", n)).collect()
}
