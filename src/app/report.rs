//! End-of-run report output

use crate::core::styles::StyleRole;
use crate::pipeline::{PipelineReport, TaskOutcome};

/// Key column width in the text report
const KEY_WIDTH: usize = 18;

/// Render the report as aligned `key: value` lines
pub fn render_report(report: &PipelineReport, use_color: bool) -> String {
    let mut lines = vec![StyleRole::Header.paint("Scenario report", use_color)];

    let mut row = |key: &str, value: String| {
        let label = format!("{:<width$}", format!("{}:", key), width = KEY_WIDTH);
        lines.push(format!("  {}{}", StyleRole::Key.paint(&label, use_color), value));
    };

    row("producer", outcome_text(&report.producer, use_color));
    row(
        "consumer",
        match &report.consumer {
            Some(outcome) => outcome_text(outcome, use_color),
            None => StyleRole::Warning.paint("still running", use_color),
        },
    );
    row(
        "join timed out",
        if report.consumer_join_timed_out {
            StyleRole::Warning.paint("yes", use_color)
        } else {
            StyleRole::Value.paint("no", use_color)
        },
    );
    row(
        "left in queue",
        StyleRole::Value.paint(&report.remaining_in_queue.to_string(), use_color),
    );
    row(
        "elapsed",
        StyleRole::Value.paint(&format!("{} ms", report.elapsed_ms), use_color),
    );
    row(
        "result",
        if report.is_drained() {
            StyleRole::Success.paint("drained", use_color)
        } else {
            StyleRole::Failure.paint("not drained", use_color)
        },
    );

    lines.join("\n")
}

fn outcome_text(outcome: &TaskOutcome, use_color: bool) -> String {
    match outcome {
        TaskOutcome::Completed { handled } => format!(
            "{} ({} handled)",
            StyleRole::Success.paint("completed", use_color),
            handled
        ),
        TaskOutcome::Cancelled { handled, remaining } => format!(
            "{} ({} handled, {} remaining)",
            StyleRole::Warning.paint("cancelled", use_color),
            handled,
            remaining
        ),
    }
}

/// Render the report as pretty-printed JSON
pub fn render_report_json(report: &PipelineReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drained_report() -> PipelineReport {
        PipelineReport {
            producer: TaskOutcome::Completed { handled: 100 },
            consumer: Some(TaskOutcome::Completed { handled: 100 }),
            consumer_join_timed_out: false,
            remaining_in_queue: 0,
            elapsed_ms: 21_034,
        }
    }

    #[test]
    fn test_plain_report_lists_outcomes() {
        let text = render_report(&drained_report(), false);

        assert!(text.starts_with("Scenario report"));
        assert!(text.contains("producer:         completed (100 handled)"));
        assert!(text.contains("consumer:         completed (100 handled)"));
        assert!(text.contains("left in queue:    0"));
        assert!(text.contains("result:           drained"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_report_for_expired_join() {
        let report = PipelineReport {
            consumer: None,
            consumer_join_timed_out: true,
            remaining_in_queue: 4,
            ..drained_report()
        };

        let text = render_report(&report, false);
        assert!(text.contains("consumer:         still running"));
        assert!(text.contains("join timed out:   yes"));
        assert!(text.contains("result:           not drained"));
    }

    #[test]
    fn test_cancelled_outcome_shows_remaining() {
        let report = PipelineReport {
            producer: TaskOutcome::Cancelled {
                handled: 7,
                remaining: 93,
            },
            ..drained_report()
        };

        let text = render_report(&report, false);
        assert!(text.contains("cancelled (7 handled, 93 remaining)"));
    }

    #[test]
    fn test_coloured_report_uses_escape_codes() {
        let text = render_report(&drained_report(), true);
        assert!(text.contains("\x1b[33mScenario report\x1b[0m"));
        assert!(text.contains("\x1b[32mdrained\x1b[0m"));
    }

    #[test]
    fn test_json_report() {
        let json = render_report_json(&drained_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["producer"]["status"], "completed");
        assert_eq!(value["consumer"]["handled"], 100);
        assert_eq!(value["elapsed_ms"], 21_034);
    }
}
