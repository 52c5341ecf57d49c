// Tag list extraction executor (csv)

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::DownloadError;
use crate::link::LinkNormalizer;
use crate::models::{DownloadJob, JobParams, ToolConfig};
use crate::paths::PathResolver;
use crate::process::run_capture;
use crate::traits::{Clipboard, MediaJobExecutor};

/// Pulls the video's tag list out of its metadata, writes it as a CSV
/// next to the other downloads, and optionally puts the same text on
/// the clipboard. Clipboard trouble is not a failure — the file is the
/// durable artifact.
pub struct TagExtractor {
    tools: ToolConfig,
    paths: Arc<dyn PathResolver>,
    clipboard: Arc<dyn Clipboard>,
}

/// Make a video title safe to use as a file name: whitespace becomes
/// underscores, path separators and other reserved characters drop out.
fn sanitize_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') && !c.is_control())
        .collect()
}

impl TagExtractor {
    pub fn new(tools: ToolConfig, paths: Arc<dyn PathResolver>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self { tools, paths, clipboard }
    }

    async fn run(&self, job: &DownloadJob) -> Result<String, DownloadError> {
        let link = LinkNormalizer::canonicalize(&job.link).ok_or(DownloadError::InvalidLink)?;

        let copy = match &job.params {
            JobParams::Tags { copy } => *copy,
            _ => false,
        };

        let download_dir = self.paths.resolve("tags")?;

        let args = vec![
            "--dump-json".to_string(),
            "--no-warnings".to_string(),
            "--skip-download".to_string(),
            "--ffmpeg-location".to_string(),
            self.tools.ffmpeg_dir.display().to_string(),
            link,
        ];

        let output = run_capture(&self.tools.yt_dlp, &args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DownloadError::Tool(stderr));
        }

        let info: Value = serde_json::from_slice(&output.stdout)?;
        let tags: Vec<String> = info["tags"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let title = sanitize_title(info["title"].as_str().unwrap_or(""));

        let tags_text: String = tags.iter().map(|tag| format!("{},\n", tag)).collect();
        let csv_path = download_dir.join(format!("{}_tags.csv", title));
        tokio::fs::write(&csv_path, &tags_text).await?;

        if copy {
            return Ok(match self.clipboard.copy(&tags_text) {
                Ok(()) => "Tags saved to file and copied to clipboard!".to_string(),
                Err(e) => format!("Tags saved to file only (no clipboard access) {}", e),
            });
        }
        Ok("Tags saved to file".to_string())
    }
}

#[async_trait]
impl MediaJobExecutor for TagExtractor {
    fn name(&self) -> &'static str {
        "tags"
    }

    async fn execute(&self, job: &DownloadJob) -> String {
        match self.run(job).await {
            Ok(msg) => msg,
            Err(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::FixedPathResolver;
    use crate::traits::NoClipboard;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn sanitize_replaces_whitespace_and_strips_separators() {
        assert_eq!(sanitize_title("My Video"), "My_Video");
        assert_eq!(sanitize_title("a/b\\c:d*e?f\"g<h>i|j"), "abcdefghij");
        assert_eq!(sanitize_title("  spaced  out  "), "spaced__out");
        assert_eq!(sanitize_title(""), "");
    }

    #[tokio::test]
    async fn invalid_link_is_reported() {
        let tmp = TempDir::new().unwrap();
        let extractor = TagExtractor::new(
            ToolConfig::new("/nonexistent/yt-dlp", "/nonexistent/ffmpeg"),
            Arc::new(FixedPathResolver::new(tmp.path())),
            Arc::new(NoClipboard),
        );
        let job = DownloadJob {
            link: json!("ftp://youtu.be/abc"),
            title: "T".into(),
            params: JobParams::Tags { copy: false },
        };
        assert_eq!(extractor.execute(&job).await, "Invalid link provided.");
    }
}
