// Audio extraction executor (mp3 / wav)

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::DownloadError;
use crate::link::LinkNormalizer;
use crate::models::{AudioFormat, DownloadJob, JobParams, ToolConfig};
use crate::paths::PathResolver;
use crate::process::run_streaming;
use crate::traits::{MediaJobExecutor, ProgressSink};

/// Extracts the audio track at 192K into mp3 or wav. One instance
/// serves both audio queues; the job's format parameter decides.
pub struct AudioDownloader {
    tools: ToolConfig,
    paths: Arc<dyn PathResolver>,
    progress: Arc<dyn ProgressSink>,
}

impl AudioDownloader {
    pub fn new(tools: ToolConfig, paths: Arc<dyn PathResolver>, progress: Arc<dyn ProgressSink>) -> Self {
        Self { tools, paths, progress }
    }

    async fn run(&self, job: &DownloadJob) -> Result<String, DownloadError> {
        let link = LinkNormalizer::canonicalize(&job.link).ok_or(DownloadError::InvalidLink)?;

        let format = match &job.params {
            JobParams::Audio { format } => {
                AudioFormat::parse(format).ok_or(DownloadError::InvalidAudioFormat)?
            }
            _ => return Err(DownloadError::InvalidAudioFormat),
        };

        let download_dir = self.paths.resolve(format.flag())?;
        let output_template = download_dir.join("%(title)s.%(ext)s").display().to_string();

        let args = vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            format.flag().to_string(),
            "--audio-quality".to_string(),
            "192K".to_string(),
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
            return Err(DownloadError::Tool(output.stderr));
        }

        Ok(format!("{} download completed!", format.upper()))
    }
}

#[async_trait]
impl MediaJobExecutor for AudioDownloader {
    fn name(&self) -> &'static str {
        "audio"
    }

    async fn execute(&self, job: &DownloadJob) -> String {
        match self.run(job).await {
            Ok(msg) => msg,
            Err(e) => e.to_string(),
        }
    }
}
