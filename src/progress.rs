// yt-dlp stdout progress parsing

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::DownloadProgress;

/// Parse a yt-dlp progress line like:
/// `[download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32`
/// Returns `None` for anything that is not a recognizable progress
/// event — callers treat that as "nothing to display", never an error.
pub fn parse_progress(line: &str) -> Option<DownloadProgress> {
    lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\d+\.?\d*\s*\w+/s))?(?:\s+ETA\s+(\S+))?"
        )
        .unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
        static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let speed = caps.get(3).map(|m| m.as_str());
        let eta = caps.get(4).map(|m| m.as_str());

        let status = match (speed, eta) {
            (Some(speed), Some(eta)) => {
                format!("{:.1}% of {} at {} ETA {}", percent, size, speed, eta)
            }
            (Some(speed), None) => format!("{:.1}% of {} at {}", percent, size, speed),
            _ => format!("{:.1}% of {}", percent, size),
        };
        return Some(DownloadProgress { percent, status });
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .chars()
            .take(60)
            .collect();
        return Some(DownloadProgress {
            percent: 0.0,
            status: format!("Starting: {}", short_name),
        });
    }

    if MERGE_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 99.0,
            status: "Merging video and audio...".to_string(),
        });
    }

    if ALREADY_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 100.0,
            status: "File already downloaded".to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_percent_and_speed() {
        let p = parse_progress("[download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32")
            .expect("progress line");
        assert!((p.percent - 6.2).abs() < f32::EPSILON);
        assert!(p.status.contains("420.30KiB/s"));
        assert!(p.status.contains("ETA 12:32"));
    }

    #[test]
    fn parses_destination_line() {
        let p = parse_progress("[download] Destination: /tmp/mp4/Some Video_720p.mp4").unwrap();
        assert_eq!(p.percent, 0.0);
        assert!(p.status.contains("Some Video_720p.mp4"));
    }

    #[test]
    fn parses_merger_and_already_downloaded() {
        assert_eq!(parse_progress("[Merger] Merging formats into \"x.mp4\"").unwrap().percent, 99.0);
        let done = parse_progress("[download] x.mp4 has already been downloaded").unwrap();
        assert_eq!(done.percent, 100.0);
    }

    #[test]
    fn garbage_lines_are_ignored() {
        assert!(parse_progress("").is_none());
        assert!(parse_progress("[youtube] dQw4w9WgXcQ: Downloading webpage").is_none());
        assert!(parse_progress("[download] nonsense without percent").is_none());
    }
}
