// Video download executor (mp4)

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::DownloadError;
use crate::link::LinkNormalizer;
use crate::models::{DownloadJob, JobParams, Quality, ToolConfig};
use crate::paths::PathResolver;
use crate::process::run_streaming;
use crate::traits::{MediaJobExecutor, ProgressSink};

/// Downloads a video at an exact height and merges it into mp4.
pub struct VideoDownloader {
    tools: ToolConfig,
    paths: Arc<dyn PathResolver>,
    progress: Arc<dyn ProgressSink>,
}

impl VideoDownloader {
    pub fn new(tools: ToolConfig, paths: Arc<dyn PathResolver>, progress: Arc<dyn ProgressSink>) -> Self {
        Self { tools, paths, progress }
    }

    async fn run(&self, job: &DownloadJob) -> Result<String, DownloadError> {
        let link = LinkNormalizer::canonicalize(&job.link).ok_or(DownloadError::InvalidLink)?;

        let quality = match &job.params {
            JobParams::Video { quality } => Quality::parse(quality).ok_or(DownloadError::InvalidQuality)?,
            _ => return Err(DownloadError::InvalidQuality),
        };
        let height = quality.height();

        let download_dir = self.paths.resolve("mp4")?;
        let output_template = download_dir
            .join(format!("%(title)s_{}p.%(ext)s", height))
            .display()
            .to_string();

        let args = vec![
            "--format".to_string(),
            format!("bestvideo[height={}]+bestaudio/best[height={}]", height, height),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "--ffmpeg-location".to_string(),
            self.tools.ffmpeg_dir.display().to_string(),
            "--output".to_string(),
            output_template,
            "--no-warnings".to_string(),
            "--newline".to_string(),
            "--quiet".to_string(),
            link,
        ];

        let output = run_streaming(&self.tools.yt_dlp, &args, self.progress.as_ref()).await?;

        if !output.status.success() {
            // yt-dlp reports a missing exact height with an empty stderr
            // under --quiet, so supply the likely cause.
            let stderr = if output.stderr.is_empty() {
                "Incorrect video quality".to_string()
            } else {
                output.stderr
            };
            return Err(DownloadError::Tool(stderr));
        }

        Ok("Download completed!".to_string())
    }
}

#[async_trait]
impl MediaJobExecutor for VideoDownloader {
    fn name(&self) -> &'static str {
        "video"
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
    use crate::traits::LogProgress;
    use serde_json::json;
    use tempfile::TempDir;

    fn downloader(tmp: &TempDir) -> VideoDownloader {
        VideoDownloader::new(
            ToolConfig::new("/nonexistent/yt-dlp", "/nonexistent/ffmpeg"),
            Arc::new(FixedPathResolver::new(tmp.path())),
            Arc::new(LogProgress),
        )
    }

    #[tokio::test]
    async fn invalid_link_short_circuits_before_anything_else() {
        let tmp = TempDir::new().unwrap();
        let job = DownloadJob {
            link: json!("https://example.com/x"),
            title: "T".into(),
            params: JobParams::Video { quality: json!(720) },
        };
        assert_eq!(downloader(&tmp).execute(&job).await, "Invalid link provided.");
    }

    #[tokio::test]
    async fn bad_quality_is_rejected_before_spawning() {
        let tmp = TempDir::new().unwrap();
        for quality in [json!(true), json!(721), json!("720"), json!(720.5)] {
            let job = DownloadJob {
                link: json!("https://youtu.be/dQw4w9WgXcQ"),
                title: "T".into(),
                params: JobParams::Video { quality },
            };
            assert_eq!(downloader(&tmp).execute(&job).await, "Incorrect video quality.");
        }
    }

    #[tokio::test]
    async fn missing_binary_is_reported_not_raised() {
        let tmp = TempDir::new().unwrap();
        let job = DownloadJob {
            link: json!("https://youtu.be/dQw4w9WgXcQ"),
            title: "T".into(),
            params: JobParams::Video { quality: json!(720) },
        };
        let msg = downloader(&tmp).execute(&job).await;
        assert!(msg.starts_with("Download failed: "), "got: {}", msg);
    }
}
