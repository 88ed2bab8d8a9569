//! Watch page scraping: visitor token, caption languages and basic metadata.
//!
//! There is no structured API for any of this. The values live in the inline
//! `ytInitialPlayerResponse` / `ytcfg` blobs of the HTML, so each one is located
//! by key and extracted independently. A missing or unparsable value degrades
//! to its default instead of failing the call.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::TranscriptError;
use crate::transport::{HttpRequest, Transport};
use crate::video_id::VideoId;

static VISITOR_DATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""visitorData"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
}

/// A caption track advertised by the watch page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTrack {
    pub language_code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing)]
    pub base_url: String,
}

impl LanguageTrack {
    pub fn new(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            name: String::new(),
            kind: None,
            base_url: String::new(),
        }
    }

    /// Auto-generated (speech recognition) track.
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchPage {
    pub visitor_data: String,
    pub languages: Vec<LanguageTrack>,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    #[serde(default)]
    base_url: String,
    language_code: String,
    #[serde(default)]
    name: Option<RawText>,
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawText {
    #[serde(default)]
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<RawRun>,
}

#[derive(Debug, Deserialize)]
struct RawRun {
    #[serde(default)]
    text: String,
}

impl RawText {
    fn flatten(self) -> String {
        match self.simple_text {
            Some(text) => text,
            None => self.runs.into_iter().map(|r| r.text).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawVideoDetails {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
}

/// GET the public watch page and scrape it.
pub async fn fetch_watch_page<T: Transport + ?Sized>(
    transport: &T,
    config: &EngineConfig,
    video_id: &VideoId,
) -> Result<WatchPage, TranscriptError> {
    let request = HttpRequest::get(video_id.watch_url())
        .header("User-Agent", config.desktop_user_agent.as_str())
        .header("Accept-Language", config.accept_language.as_str())
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        );

    let response = transport.execute(request).await?;
    if !response.is_success() {
        return Err(TranscriptError::network(
            Some(response.status),
            format!("watch page request for {} failed", video_id),
        ));
    }

    let page = parse_watch_page(&response.body);
    debug!(
        target: "engine.youtube",
        video_id = %video_id,
        has_visitor_data = !page.visitor_data.is_empty(),
        languages = page.languages.len(),
        "scraped watch page"
    );
    Ok(page)
}

pub fn parse_watch_page(html: &str) -> WatchPage {
    WatchPage {
        visitor_data: extract_visitor_data(html).unwrap_or_default(),
        languages: extract_caption_tracks(html),
        metadata: extract_metadata(html),
    }
}

pub fn extract_visitor_data(html: &str) -> Option<String> {
    let raw = VISITOR_DATA_RE.captures(html)?.get(1)?.as_str();
    decode_json_string(raw)
}

pub fn extract_caption_tracks(html: &str) -> Vec<LanguageTrack> {
    let raw = match json_value_after_key(html, "captionTracks") {
        Some(raw) => Cow::Borrowed(raw),
        None => match escaped_value_after_key(html, "captionTracks") {
            Some(raw) => Cow::Owned(raw),
            None => return Vec::new(),
        },
    };

    match serde_json::from_str::<Vec<RawCaptionTrack>>(&raw) {
        Ok(tracks) => tracks
            .into_iter()
            .map(|t| LanguageTrack {
                language_code: t.language_code,
                name: t.name.map(RawText::flatten).unwrap_or_default(),
                kind: t.kind,
                base_url: t.base_url,
            })
            .collect(),
        Err(e) => {
            warn!(target: "engine.youtube", error = %e, "could not parse captionTracks");
            Vec::new()
        }
    }
}

pub fn extract_metadata(html: &str) -> VideoMetadata {
    let details = json_value_after_key(html, "videoDetails")
        .and_then(|raw| serde_json::from_str::<RawVideoDetails>(raw).ok())
        .unwrap_or_default();

    VideoMetadata {
        title: html_escape::decode_html_entities(&details.title).into_owned(),
        author: html_escape::decode_html_entities(&details.author).into_owned(),
    }
}

fn decode_json_string(raw: &str) -> Option<String> {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).ok()
}

/// Slice of the JSON array or object that follows `"key":`, found by bracket
/// matching (string contents and escapes are skipped).
fn json_value_after_key<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{}\":", key);
    let start = text.find(&needle)? + needle.len();
    let rest = text[start..].trim_start();
    let offset = text.len() - rest.len();
    let len = balanced_len(rest)?;
    Some(&text[offset..offset + len])
}

/// Like [`json_value_after_key`], for a blob that is itself embedded in a
/// JSON string literal (every quote arrives as `\"`).
fn escaped_value_after_key(text: &str, key: &str) -> Option<String> {
    let needle = format!("\\\"{}\\\":", key);
    let start = text.find(&needle)? + needle.len();
    let unescaped = unescape_once(&text[start..]);
    let rest = unescaped.trim_start();
    let len = balanced_len(rest)?;
    Some(rest[..len].to_string())
}

/// Strips one level of string-literal escaping. `\uXXXX` and friends are kept
/// for the JSON parser.
fn unescape_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('"' | '\\' | '/')) => out.push(next),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn balanced_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let (open, close) = match bytes.first()? {
        b'[' => (b'[', b']'),
        b'{' => (b'{', b'}'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
