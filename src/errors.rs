// Error types for media job executors

use thiserror::Error;

/// Failures a media job can run into. The `Display` strings are the
/// result messages the rest of the system hands to callers verbatim,
/// so changing them is a behavior change, not a cosmetic one.
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// Link failed validation or canonicalization
    #[error("Invalid link provided.")]
    InvalidLink,

    /// Video quality outside the supported set (or not an integer)
    #[error("Incorrect video quality.")]
    InvalidQuality,

    /// Audio format other than mp3/wav
    #[error("Incorrect audio format.")]
    InvalidAudioFormat,

    /// yt-dlp exited non-zero; payload is its captured stderr
    #[error("Download failed: {0}")]
    Tool(String),

    /// Anything else: spawn failure, I/O, JSON decode, path resolution
    #[error("Download failed: {0}")]
    Unexpected(String),
}

impl From<crate::paths::PathError> for DownloadError {
    fn from(e: crate::paths::PathError) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl From<serde_json::Error> for DownloadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Unexpected(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_contract() {
        assert_eq!(DownloadError::InvalidLink.to_string(), "Invalid link provided.");
        assert_eq!(DownloadError::InvalidQuality.to_string(), "Incorrect video quality.");
        assert_eq!(
            DownloadError::InvalidAudioFormat.to_string(),
            "Incorrect audio format."
        );
        assert_eq!(
            DownloadError::Tool("ERROR: boom".into()).to_string(),
            "Download failed: ERROR: boom"
        );
    }

    #[test]
    fn io_errors_become_download_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "yt-dlp missing");
        let err: DownloadError = io.into();
        assert_eq!(err.to_string(), "Download failed: yt-dlp missing");
    }
}
