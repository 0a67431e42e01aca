//! Progress reporting for operations that take noticeable time (image
//! transcoding). The MCP layer reports to the client when it asked for
//! progress; the CLI logs; tests pass the no-op.

use std::sync::Arc;

use async_trait::async_trait;

#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// Never fails the caller.
    async fn report(&self, current: f64, total: f64, message: Option<String>);

    /// Report `step` of `total_steps` as a fraction of 1.0.
    async fn step(&self, step: usize, total_steps: usize, message: &str) {
        let current = if total_steps == 0 {
            1.0
        } else {
            step as f64 / total_steps as f64
        };
        self.report(current, 1.0, Some(message.to_string())).await;
    }
}

pub struct NoopProgressReporter;

#[async_trait]
impl ProgressReporter for NoopProgressReporter {
    async fn report(&self, _current: f64, _total: f64, _message: Option<String>) {}
}

pub fn noop_progress() -> Arc<dyn ProgressReporter> {
    Arc::new(NoopProgressReporter)
}

/// Writes progress to the `tracing` debug log.
pub struct TracingProgressReporter;

#[async_trait]
impl ProgressReporter for TracingProgressReporter {
    async fn report(&self, current: f64, total: f64, message: Option<String>) {
        tracing::debug!(current, total, message = message.as_deref().unwrap_or(""), "Progress");
    }
}

pub fn tracing_progress() -> Arc<dyn ProgressReporter> {
    Arc::new(TracingProgressReporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        seen: Mutex<Vec<(f64, Option<String>)>>,
    }

    #[async_trait]
    impl ProgressReporter for RecordingReporter {
        async fn report(&self, current: f64, _total: f64, message: Option<String>) {
            self.seen.lock().unwrap().push((current, message));
        }
    }

    #[tokio::test]
    async fn test_steps_are_fractions() {
        let reporter = RecordingReporter::default();
        reporter.step(0, 2, "start").await;
        reporter.step(1, 2, "middle").await;
        reporter.step(2, 2, "done").await;
        let seen = reporter.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (0.0, Some("start".to_string())),
                (0.5, Some("middle".to_string())),
                (1.0, Some("done".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_steps_reports_complete() {
        let reporter = RecordingReporter::default();
        reporter.step(0, 0, "nothing to do").await;
        assert_eq!(reporter.seen.lock().unwrap()[0].0, 1.0);
    }

    #[tokio::test]
    async fn test_builtin_reporters_accept_calls() {
        noop_progress().step(1, 3, "noop").await;
        tracing_progress().report(0.3, 1.0, None).await;
    }
}
