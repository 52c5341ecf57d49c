// Shared yt-dlp process plumbing

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::errors::DownloadError;
use crate::progress::parse_progress;
use crate::traits::ProgressSink;

/// What a streamed run leaves behind once the child has exited.
pub struct StreamedOutput {
    pub status: ExitStatus,
    /// Captured stderr, already decoded and trimmed.
    pub stderr: String,
}

/// Spawn the tool, forward each stdout line through the progress parser
/// into `progress`, and collect stderr on the side. Suspension points —
/// spawn, line reads, wait — are where sibling jobs get to run.
///
/// Unparseable stdout lines are dropped; they are display sugar, not
/// part of the contract.
pub async fn run_streaming(
    bin: &Path,
    args: &[String],
    progress: &dyn ProgressSink,
) -> Result<StreamedOutput, DownloadError> {
    let mut child = Command::new(bin)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // Reap the child if an I/O error aborts the read loop early.
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DownloadError::Unexpected(format!("Failed to start {}: {}", bin.display(), e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::Unexpected("Failed to capture stdout".to_string()))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::Unexpected("Failed to capture stderr".to_string()))?;

    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf).await;
        String::from_utf8_lossy(&buf).trim().to_string()
    });

    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| DownloadError::Unexpected(e.to_string()))?
    {
        if let Some(update) = parse_progress(&line) {
            progress.emit(update);
        } else if !line.trim().is_empty() {
            debug!("yt-dlp: {}", line);
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| DownloadError::Unexpected(e.to_string()))?;
    let stderr = stderr_task.await.unwrap_or_default();

    Ok(StreamedOutput { status, stderr })
}

/// Run the tool to completion and capture both pipes whole. Used where
/// the payload is stdout itself (`--dump-json`).
pub async fn run_capture(bin: &Path, args: &[String]) -> Result<std::process::Output, DownloadError> {
    Command::new(bin)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| DownloadError::Unexpected(format!("Failed to start {}: {}", bin.display(), e)))
}
