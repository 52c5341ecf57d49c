// Video metadata probe

use std::collections::BTreeSet;

use serde_json::Value;

use crate::errors::DownloadError;
use crate::link::LinkNormalizer;
use crate::models::ToolConfig;
use crate::process::run_capture;

/// Summary of a video the UI shows before anything is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub title: String,
    pub uploader: String,
    pub description: String,
    /// `m:ss`
    pub duration: String,
    /// Progressive mp4 renditions, lowest first: `"mp4 720p 30fps"`.
    pub qualities: Vec<String>,
}

/// Fetches and summarizes metadata through `--dump-json`, without
/// downloading anything.
pub struct VideoProbe {
    tools: ToolConfig,
}

impl VideoProbe {
    pub fn new(tools: ToolConfig) -> Self {
        Self { tools }
    }

    pub async fn fetch(&self, link: &Value) -> Result<VideoDetails, DownloadError> {
        let link = LinkNormalizer::canonicalize(link).ok_or(DownloadError::InvalidLink)?;

        let args = vec![
            "--dump-json".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "--skip-download".to_string(),
            "--ffmpeg-location".to_string(),
            self.tools.ffmpeg_dir.display().to_string(),
            link.clone(),
        ];

        let output = run_capture(&self.tools.yt_dlp, &args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("Private video") || stderr.to_lowercase().contains("unavailable") {
                return Err(DownloadError::Unexpected(format!(
                    "video may be unavailable or private: {}",
                    link
                )));
            }
            return Err(DownloadError::Tool(stderr));
        }

        let info: Value = serde_json::from_slice(&output.stdout)?;
        Ok(summarize(&info))
    }
}

/// Reduce a yt-dlp metadata document to the fields the UI cares about.
fn summarize(info: &Value) -> VideoDetails {
    // Only renditions carrying both streams in an mp4 container count
    // as a selectable quality.
    let mut renditions: BTreeSet<(u64, u64)> = BTreeSet::new();
    if let Some(formats) = info["formats"].as_array() {
        for format in formats {
            let has_video = format["vcodec"].as_str().map_or(false, |v| v != "none");
            let has_audio = format["acodec"].as_str().map_or(false, |a| a != "none");
            if !has_video || !has_audio || format["ext"].as_str() != Some("mp4") {
                continue;
            }
            if let (Some(height), Some(fps)) = (format["height"].as_u64(), format["fps"].as_f64()) {
                renditions.insert((height, fps as u64));
            }
        }
    }

    let seconds = info["duration"].as_f64().unwrap_or(0.0) as i64;
    let minutes = seconds / 60;
    let remaining = seconds % 60;

    VideoDetails {
        title: info["title"].as_str().unwrap_or("Unknown").to_string(),
        uploader: info["uploader"].as_str().unwrap_or("Unknown").to_string(),
        description: info["description"].as_str().unwrap_or("").to_string(),
        duration: format!("{}:{:02}", minutes, remaining),
        qualities: renditions
            .into_iter()
            .map(|(height, fps)| format!("mp4 {}p {}fps", height, fps))
            .collect(),
    }
}
