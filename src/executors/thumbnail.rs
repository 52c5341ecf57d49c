// Thumbnail download executor (jpg)

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::DownloadError;
use crate::link::LinkNormalizer;
use crate::models::{DownloadJob, ToolConfig};
use crate::paths::PathResolver;
use crate::process::run_streaming;
use crate::traits::{MediaJobExecutor, ProgressSink};

/// Fetches the video's thumbnail and converts it to jpg without
/// downloading the media itself.
pub struct ThumbnailDownloader {
    tools: ToolConfig,
    paths: Arc<dyn PathResolver>,
    progress: Arc<dyn ProgressSink>,
}

impl ThumbnailDownloader {
    pub fn new(tools: ToolConfig, paths: Arc<dyn PathResolver>, progress: Arc<dyn ProgressSink>) -> Self {
        Self { tools, paths, progress }
    }

    async fn run(&self, job: &DownloadJob) -> Result<String, DownloadError> {
        let link = LinkNormalizer::canonicalize(&job.link).ok_or(DownloadError::InvalidLink)?;

        let download_dir = self.paths.resolve("jpg")?;
        let output_template = download_dir.join("%(title)s.%(ext)s").display().to_string();

        let args = vec![
            "--skip-download".to_string(),
            "--write-thumbnail".to_string(),
            "--convert-thumbnails".to_string(),
            "jpg".to_string(),
            "--ffmpeg-location".to_string(),
            self.tools.ffmpeg_dir.display().to_string(),
            "--output".to_string(),
            output_template,
            "--no-warnings".to_string(),
            link,
        ];

        let output = run_streaming(&self.tools.yt_dlp, &args, self.progress.as_ref()).await?;

        if !output.status.success() {
            return Err(DownloadError::Tool(output.stderr));
        }

        Ok("Thumbnail download completed!".to_string())
    }
}

#[async_trait]
impl MediaJobExecutor for ThumbnailDownloader {
    fn name(&self) -> &'static str {
        "thumbnail"
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
    use crate::models::JobParams;
    use crate::paths::FixedPathResolver;
    use crate::traits::LogProgress;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn invalid_link_is_reported() {
        let tmp = TempDir::new().unwrap();
        let downloader = ThumbnailDownloader::new(
            ToolConfig::new("/nonexistent/yt-dlp", "/nonexistent/ffmpeg"),
            Arc::new(FixedPathResolver::new(tmp.path())),
            Arc::new(LogProgress),
        );
        let job = DownloadJob {
            link: json!("https://example.com/nope"),
            title: "T".into(),
            params: JobParams::Thumbnail,
        };
        assert_eq!(downloader.execute(&job).await, "Invalid link provided.");
    }
}
