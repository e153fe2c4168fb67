//! Runs that finish with an empty queue

use crate::common::{fast_settings, requests};
use drainq::pipeline::{
    run_scenario, Pipeline, PipelineSettings, RecordingObserver, SilentObserver, TaskOutcome,
};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

#[test]
#[serial]
fn test_every_produced_message_is_consumed_in_order() {
    let observer = Arc::new(RecordingObserver::new());
    let pipeline = Pipeline::new(fast_settings(40))
        .unwrap()
        .with_observer(observer.clone());

    let report = pipeline.run().unwrap();

    assert!(report.is_drained());
    assert!(!report.was_cancelled());
    assert_eq!(report.producer, TaskOutcome::Completed { handled: 40 });
    assert_eq!(report.consumer, Some(TaskOutcome::Completed { handled: 40 }));
    assert_eq!(observer.produced(), requests(1..=40));
    assert_eq!(observer.consumed(), requests(1..=40));
    assert_eq!(pipeline.queue().len().unwrap(), 0);
}

#[test]
#[serial]
fn test_slow_consumer_still_drains_within_join_bound() {
    let settings = PipelineSettings {
        process_delay: Duration::from_millis(5),
        ..fast_settings(30)
    };
    let observer = Arc::new(RecordingObserver::new());

    let report = Pipeline::new(settings)
        .unwrap()
        .with_observer(observer.clone())
        .run()
        .unwrap();

    assert!(report.is_drained());
    assert!(!report.consumer_join_timed_out);
    assert_eq!(observer.consumed(), observer.produced());
}

#[test]
#[serial]
fn test_no_messages_still_drains() {
    let report = Pipeline::new(fast_settings(0))
        .unwrap()
        .with_observer(Arc::new(SilentObserver))
        .run()
        .unwrap();

    assert!(report.is_drained());
    assert_eq!(report.producer.handled(), 0);
    assert_eq!(report.consumer.map(|c| c.handled()), Some(0));
}

#[test]
#[serial]
fn test_run_scenario_with_console_output() {
    let report = run_scenario(fast_settings(3)).unwrap();

    assert!(report.is_drained());
    assert_eq!(report.consumer, Some(TaskOutcome::Completed { handled: 3 }));
}

/// 100 messages at the default pacing. The consumer falls behind the
/// producer, so whether it drains inside the 10s join bound depends on
/// timing; this records the outcome rather than asserting on it.
#[test]
#[serial]
#[ignore = "slow"]
fn test_default_scenario_outcome() {
    let observer = Arc::new(RecordingObserver::new());
    let pipeline = Pipeline::new(PipelineSettings::default())
        .unwrap()
        .with_observer(observer.clone());

    let report = pipeline.run().unwrap();
    pipeline.cancel();

    println!("{}", serde_json::to_string_pretty(&report).unwrap());
    assert_eq!(report.producer, TaskOutcome::Completed { handled: 100 });
    assert_eq!(observer.produced(), requests(1..=100));
    if report.consumer_join_timed_out {
        assert_eq!(report.consumer, None);
    } else {
        assert!(report.is_drained());
    }
}
