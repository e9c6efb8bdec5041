use mailsmith_core::error::DispatchError;
use mailsmith_core::recorder::{BaseRecorder, DryRunPreview, Recorder};
use metrics::{counter, Counter};

/// Logs like [`BaseRecorder`] and counts dispatch outcomes.
pub struct MetricsRecorder {
    inner: BaseRecorder,
    dry_run: Counter,
    sent: Counter,
    failed: Counter,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: BaseRecorder::new(),
            dry_run: counter!("mailsmith_emails_total", "outcome" => "dry_run"),
            sent: counter!("mailsmith_emails_total", "outcome" => "sent"),
            failed: counter!("mailsmith_emails_total", "outcome" => "failed"),
        }
    }
}

impl Recorder for MetricsRecorder {
    fn record_dry_run(&self, preview: &DryRunPreview) {
        self.dry_run.increment(1);
        self.inner.record_dry_run(preview);
    }

    fn record_sent(&self, provider: &str, recipients: usize, message_id: Option<&str>) {
        self.sent.increment(1);
        self.inner.record_sent(provider, recipients, message_id);
    }

    fn record_failed(&self, provider: &str, error: &DispatchError) {
        self.failed.increment(1);
        self.inner.record_failed(provider, error);
    }
}
