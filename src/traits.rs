// Executor trait and the ports the core depends on

use async_trait::async_trait;
use tracing::{debug, info};

use crate::models::{DownloadJob, DownloadProgress};

/// One implementation per media kind. `execute` owns the whole job
/// pipeline — validation, process invocation, outcome classification —
/// and always resolves to a plain result message: errors are converted
/// at this boundary, never propagated to the runner.
#[async_trait]
pub trait MediaJobExecutor: Send + Sync {
    /// Short name of the executor (for logging)
    fn name(&self) -> &'static str;

    /// Run one job to completion and describe the outcome.
    async fn execute(&self, job: &DownloadJob) -> String;
}

/// Where per-job progress events go. The GUI plugs a channel in here;
/// the default just logs.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: DownloadProgress);
}

/// Progress sink that forwards to `tracing` at debug level.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn emit(&self, progress: DownloadProgress) {
        debug!(percent = progress.percent, "{}", progress.status);
    }
}

/// System clipboard access for the tags executor. Failure is expected
/// (headless sessions, no display server) and degrades to a
/// file-only result, so the error is a plain description.
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), String>;
}

/// Default clipboard: none. Always reports the backend as unavailable.
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _text: &str) -> Result<(), String> {
        Err("clipboard backend not available".to_string())
    }
}

/// Call log port: every public queue/executor call is recorded with its
/// arguments and result string at the exit point.
pub trait CallLog: Send + Sync {
    fn record(&self, method: &str, args: &str, result: &str);
}

/// Call log that writes `tracing` events.
pub struct TracingCallLog;

impl CallLog for TracingCallLog {
    fn record(&self, method: &str, args: &str, result: &str) {
        info!(target: "vidgrab::calls", "{} | args: {} | result: {}", method, args, result);
    }
}

/// Call log that drops everything (tests, embedders with their own
/// instrumentation).
pub struct NoCallLog;

impl CallLog for NoCallLog {
    fn record(&self, _method: &str, _args: &str, _result: &str) {}
}
