// YouTube link validation and canonicalization

use serde_json::Value;
use url::Url;

/// Accepted prefixes after scheme normalization. Anything else is not a
/// YouTube watch link as far as this crate is concerned.
const VALID_PREFIXES: [&str; 4] = [
    "https://www.youtube.com/watch?v=",
    "https://youtu.be/",
    "http://www.youtube.com/watch?v=",
    "http://youtu.be/",
];

/// Validates raw user input and reduces it to one canonical watch URL.
///
/// Input arrives as an untyped `serde_json::Value` because the boundary
/// must reject non-string values instead of coercing them.
pub struct LinkNormalizer;

impl LinkNormalizer {
    /// Trim and prepend `https://` when the user pasted a bare
    /// `youtu.be/...` or `www.youtube.com/...` link.
    fn normalize_scheme(link: &str) -> String {
        let link = link.trim();
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!("https://{}", link)
        }
    }

    /// Whether `link` is a YouTube watch link (long or short host).
    pub fn validate_str(link: &str) -> bool {
        let normalized = Self::normalize_scheme(link);
        VALID_PREFIXES.iter().any(|p| normalized.starts_with(p))
    }

    /// Untyped-boundary variant: non-string input is simply invalid.
    pub fn validate(raw: &Value) -> bool {
        raw.as_str().map(Self::validate_str).unwrap_or(false)
    }

    /// Extract the video id and return `https://www.youtube.com/watch?v={id}`.
    ///
    /// Short-host links carry the id in the path, long-host links in the
    /// `v` query parameter; tracking/playlist parameters are discarded.
    /// A link whose host matches but yields no id comes back normalized
    /// and otherwise untouched. Every parse failure is `None` — this
    /// never panics or returns an error.
    pub fn canonicalize(raw: &Value) -> Option<String> {
        let link = raw.as_str()?;
        if !Self::validate_str(link) {
            return None;
        }

        let normalized = Self::normalize_scheme(link);
        let parsed = Url::parse(&normalized).ok()?;
        let host = parsed.host_str()?;

        if host.contains("youtu.be") {
            let video_id = parsed.path().trim_start_matches('/');
            return Some(format!("https://www.youtube.com/watch?v={}", video_id));
        }

        if host.contains("youtube.com") {
            if let Some((_, video_id)) = parsed.query_pairs().find(|(k, _)| k == "v") {
                return Some(format!("https://www.youtube.com/watch?v={}", video_id));
            }
        }

        Some(normalized)
    }
}
