//! Runs stopped through cancellation tokens

use crate::common::{fast_settings, requests};
use drainq::core::cancel::CancellationToken;
use drainq::pipeline::{
    Pipeline, PipelineObserver, PipelineSettings, RecordingObserver, SilentObserver, TaskOutcome,
};
use drainq::queue::Message;
use serial_test::serial;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Cancels a token the first time a given payload is produced
struct CancelAfterProducing {
    token: CancellationToken,
    payload: &'static str,
    record: RecordingObserver,
}

impl PipelineObserver for CancelAfterProducing {
    fn on_produced(&self, message: &Message) {
        self.record.on_produced(message);
        if message.data == self.payload {
            self.token.cancel();
        }
    }

    fn on_consumed(&self, message: &Message) {
        self.record.on_consumed(message);
    }
}

#[test]
#[serial]
fn test_cancelled_producer_reports_unproduced_remainder() {
    let pipeline = Pipeline::new(fast_settings(10)).unwrap();
    let observer = Arc::new(CancelAfterProducing {
        token: pipeline.producer_token(),
        payload: "Request 3",
        record: RecordingObserver::new(),
    });
    let pipeline = pipeline.with_observer(observer.clone());

    let report = pipeline.run().unwrap();

    assert_eq!(
        report.producer,
        TaskOutcome::Cancelled {
            handled: 3,
            remaining: 7
        }
    );
    // The consumer is untouched and drains what was produced
    assert_eq!(report.consumer, Some(TaskOutcome::Completed { handled: 3 }));
    assert_eq!(observer.record.consumed(), requests(1..=3));
    assert!(report.is_drained());
    assert!(report.was_cancelled());
}

#[test]
#[serial]
fn test_parent_token_reaches_both_tasks() {
    let settings = PipelineSettings {
        produce_interval: Duration::from_millis(10),
        process_delay: Duration::from_millis(50),
        ..fast_settings(500)
    };
    let root = CancellationToken::new();
    let pipeline = Pipeline::new(settings)
        .unwrap()
        .with_observer(Arc::new(SilentObserver))
        .with_cancellation(root.child_token());

    let canceller = {
        let root = root.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            root.cancel();
        })
    };
    let start = Instant::now();
    let report = pipeline.run().unwrap();
    canceller.join().unwrap();

    assert!(start.elapsed() < Duration::from_secs(3));
    assert!(report.producer.is_cancelled());
    assert!(report.producer.remaining() > 0);
    let consumer = report.consumer.unwrap();
    assert!(consumer.is_cancelled());
    assert!(report.remaining_in_queue > 0);
}

#[test]
#[serial]
fn test_pre_cancelled_pipeline_produces_nothing() {
    let root = CancellationToken::new();
    root.cancel();
    let observer = Arc::new(RecordingObserver::new());

    let report = Pipeline::new(fast_settings(5))
        .unwrap()
        .with_observer(observer.clone())
        .with_cancellation(root)
        .run()
        .unwrap();

    assert_eq!(
        report.producer,
        TaskOutcome::Cancelled {
            handled: 0,
            remaining: 5
        }
    );
    assert!(report.consumer.unwrap().is_cancelled());
    assert!(observer.produced().is_empty());
    assert!(report.is_drained());
}
