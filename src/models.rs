// Common data models for the queue and executors

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Target vertical video resolution, restricted to the set yt-dlp is
/// asked for with `bestvideo[height=H]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    P144,
    P240,
    P360,
    P480,
    P720,
    P1080,
    P1440,
    P2160,
}

impl Quality {
    /// Height in pixels, as used in format strings and output templates.
    pub fn height(&self) -> u32 {
        match self {
            Self::P144 => 144,
            Self::P240 => 240,
            Self::P360 => 360,
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
            Self::P1440 => 1440,
            Self::P2160 => 2160,
        }
    }

    pub fn from_height(height: i64) -> Option<Self> {
        match height {
            144 => Some(Self::P144),
            240 => Some(Self::P240),
            360 => Some(Self::P360),
            480 => Some(Self::P480),
            720 => Some(Self::P720),
            1080 => Some(Self::P1080),
            1440 => Some(Self::P1440),
            2160 => Some(Self::P2160),
            _ => None,
        }
    }

    /// Parse an untyped quality parameter as it arrives from the UI.
    /// Only plain integers in the supported set are accepted: JSON
    /// booleans, floats and numeric strings all come back as `None`.
    pub fn parse(raw: &Value) -> Option<Self> {
        match raw {
            Value::Number(n) => n.as_i64().and_then(Self::from_height),
            _ => None,
        }
    }
}

/// Audio container/codec the extractor is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    /// Case-insensitive parse: "mp3", "MP3", " Wav " are all fine.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MP3" => Some(Self::Mp3),
            "WAV" => Some(Self::Wav),
            _ => None,
        }
    }

    /// Value for yt-dlp's `--audio-format` flag.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// Upper-case name used in success messages.
    pub fn upper(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Wav => "WAV",
        }
    }
}

/// The five media kinds, each with its own queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueKind {
    Video,
    Mp3Audio,
    WavAudio,
    Thumbnail,
    Tags,
}

impl QueueKind {
    /// Parse the wire token accepted by `start_queue`.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "mp4" => Some(Self::Video),
            "mp3" => Some(Self::Mp3Audio),
            "wav" => Some(Self::WavAudio),
            "jpg" => Some(Self::Thumbnail),
            "csv" => Some(Self::Tags),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Mp3Audio => "mp3",
            Self::WavAudio => "wav",
            Self::Thumbnail => "jpg",
            Self::Tags => "csv",
        }
    }

    /// Noun used in queue messages ("Audio added to queue.").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Mp3Audio | Self::WavAudio => "Audio",
            Self::Thumbnail => "Thumbnail",
            Self::Tags => "Tags",
        }
    }

    /// Extension key for the path resolver's settings map.
    pub fn ext(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Mp3Audio => "mp3",
            Self::WavAudio => "wav",
            Self::Thumbnail => "jpg",
            Self::Tags => "tags",
        }
    }
}

/// Unit of work for the mp3/wav/thumbnail/tags queues.
/// Unique by `link` within its kind's collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub link: String,
    pub title: String,
}

/// One entry of the video collection: an ordered multimap keyed by the
/// composite `(link, quality)`. The same link may appear once per
/// quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoQueueEntry {
    pub link: String,
    pub quality: Quality,
    pub title: String,
}

/// Kind-specific parameters carried alongside a job.
#[derive(Debug, Clone)]
pub enum JobParams {
    /// Raw quality value; the executor re-validates it against the set.
    Video { quality: Value },
    /// Raw format string; the executor parses it case-insensitively.
    Audio { format: String },
    Thumbnail,
    Tags { copy: bool },
}

/// A single unit of work handed to a MediaJobExecutor.
///
/// The link is kept as the untyped value the boundary received so the
/// executor contract (validate, then act) holds even when a job is
/// built directly rather than through the queue.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub link: Value,
    pub title: String,
    pub params: JobParams,
}

impl DownloadJob {
    pub fn new(link: impl Into<String>, title: impl Into<String>, params: JobParams) -> Self {
        Self {
            link: Value::String(link.into()),
            title: title.into(),
            params,
        }
    }
}

/// Locations of the external tools, injected into every executor at
/// construction so nothing resolves binaries through hidden globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Full path of the yt-dlp executable.
    pub yt_dlp: PathBuf,
    /// Directory containing ffmpeg/ffprobe (passed to `--ffmpeg-location`).
    pub ffmpeg_dir: PathBuf,
}

impl ToolConfig {
    pub fn new(yt_dlp: impl Into<PathBuf>, ffmpeg_dir: impl Into<PathBuf>) -> Self {
        Self {
            yt_dlp: yt_dlp.into(),
            ffmpeg_dir: ffmpeg_dir.into(),
        }
    }
}

/// Download progress information streamed from yt-dlp stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quality_accepts_the_fixed_set() {
        for h in [144, 240, 360, 480, 720, 1080, 1440, 2160] {
            assert!(Quality::parse(&json!(h)).is_some(), "{}p should parse", h);
        }
    }

    #[test]
    fn quality_rejects_everything_else() {
        for bad in [
            json!(true),
            json!(false),
            json!(240.5),
            json!(720.0),
            json!("240"),
            json!(0),
            json!(-720),
            json!(null),
            json!([720]),
        ] {
            assert!(Quality::parse(&bad).is_none(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn audio_format_is_case_insensitive() {
        assert_eq!(AudioFormat::parse("mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::parse("MP3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::parse(" Wav "), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::parse("flac"), None);
        assert_eq!(AudioFormat::parse(""), None);
    }

    #[test]
    fn queue_kind_tokens_round_trip() {
        for token in ["mp4", "mp3", "wav", "jpg", "csv"] {
            let kind = QueueKind::parse(token).unwrap();
            assert_eq!(kind.token(), token);
        }
        assert!(QueueKind::parse("avi").is_none());
    }
}
