//! Video identifier extraction.
//!
//! Accepts the input forms people actually paste (watch URLs, short links,
//! embed/shorts URLs, or a bare id) and reduces them to the 11-character id.
//! Patterns are tried in a fixed order and the first match wins.
//!
//! ```rust
//! use studyscribe_core::video_id::VideoId;
//!
//! let a = VideoId::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").unwrap();
//! let b = VideoId::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "dQw4w9WgXcQ");
//! ```

use crate::error::TranscriptError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static VIDEO_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// One accepted input form.
#[derive(Debug)]
pub struct IdPattern {
    pub id: &'static str,
    pub description: &'static str,
    pub example: &'static str,
    pattern: Regex,
}

static PATTERNS: Lazy<Vec<IdPattern>> = Lazy::new(|| {
    vec![
        IdPattern {
            id: "watch_url",
            description: "Watch page URL (youtube.com/watch?v=...)",
            example: "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            pattern: Regex::new(
                r"^(?:https?://)?(?:www\.|m\.|music\.)?youtube\.com/watch\?(?:[^#]*&)?v=(?P<video_id>[A-Za-z0-9_-]{11})(?:[&#]|$)",
            )
            .unwrap(),
        },
        IdPattern {
            id: "short_url",
            description: "Short URL (youtu.be/...)",
            example: "https://youtu.be/dQw4w9WgXcQ",
            pattern: Regex::new(
                r"^(?:https?://)?(?:www\.)?youtu\.be/(?P<video_id>[A-Za-z0-9_-]{11})(?:[/?&#]|$)",
            )
            .unwrap(),
        },
        IdPattern {
            id: "embed_url",
            description: "Embed, shorts or live URL (youtube.com/embed/..., /shorts/..., /live/...)",
            example: "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            pattern: Regex::new(
                r"^(?:https?://)?(?:www\.|m\.)?youtube(?:-nocookie)?\.com/(?:embed|shorts|live|v)/(?P<video_id>[A-Za-z0-9_-]{11})(?:[/?&#]|$)",
            )
            .unwrap(),
        },
        IdPattern {
            id: "bare_id",
            description: "Bare video id (11 characters)",
            example: "dQw4w9WgXcQ",
            pattern: Regex::new(r"^(?P<video_id>[A-Za-z0-9_-]{11})$").unwrap(),
        },
    ]
});

/// All accepted input forms, in the order they are tried.
pub fn patterns() -> &'static [IdPattern] {
    &PATTERNS
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    pub fn parse(input: &str) -> Result<Self, TranscriptError> {
        let input = input.trim();

        for pattern in patterns() {
            if let Some(m) = pattern
                .pattern
                .captures(input)
                .and_then(|caps| caps.name("video_id"))
            {
                tracing::trace!(pattern = pattern.id, "matched video id pattern");
                return Self::from_raw(m.as_str());
            }
        }

        Err(TranscriptError::InvalidVideoIdentifier(input.to_string()))
    }

    fn from_raw(raw: &str) -> Result<Self, TranscriptError> {
        if VIDEO_ID_RE.is_match(raw) {
            Ok(VideoId(raw.to_string()))
        } else {
            Err(TranscriptError::InvalidVideoIdentifier(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for VideoId {
    type Err = TranscriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VideoId {
    type Error = TranscriptError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_raw(&value)
    }
}

impl From<VideoId> for String {
    fn from(value: VideoId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_forms_agree() {
        let inputs = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=10s",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ#comments",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abcdef",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?start=3",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
            "  dQw4w9WgXcQ\n",
        ];

        for input in inputs {
            let id = VideoId::parse(input).unwrap_or_else(|e| panic!("{input}: {e}"));
            assert_eq!(id.as_str(), "dQw4w9WgXcQ", "input: {input}");
        }
    }

    #[test]
    fn test_ids_with_dash_and_underscore() {
        let id = VideoId::parse("https://youtu.be/a-B_c1D2e3F").unwrap();
        assert_eq!(id.as_str(), "a-B_c1D2e3F");
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let inputs = [
            "",
            "dQw4w9WgXc",
            "dQw4w9WgXcQQ",
            "dQw4w9WgX!Q",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQQQ",
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/playlist?list=PL123",
        ];

        for input in inputs {
            let err = VideoId::parse(input).unwrap_err();
            assert!(
                matches!(err, TranscriptError::InvalidVideoIdentifier(_)),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_watch_url() {
        let id: VideoId = "dQw4w9WgXcQ".parse().unwrap();
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_serde_validates() {
        let id: VideoId = serde_json::from_str("\"dQw4w9WgXcQ\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"dQw4w9WgXcQ\"");
        assert!(serde_json::from_str::<VideoId>("\"nope\"").is_err());
    }

    #[test]
    fn test_patterns_examples_resolve() {
        for pattern in patterns() {
            assert!(VideoId::parse(pattern.example).is_ok(), "{}", pattern.id);
        }
    }
}
