//! `youtubei/v1/get_transcript` client, impersonating the Android app.
//!
//! Requests carry the Android client context and headers. The response comes
//! in one of two envelopes depending on which backend answered; both are
//! tried in a fixed order.

use serde_json::{json, Value};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::TranscriptError;
use crate::transport::{HttpRequest, Transport};
use crate::youtube::page::LanguageTrack;

pub const GET_TRANSCRIPT_URL: &str =
    "https://www.youtube.com/youtubei/v1/get_transcript?prettyPrint=false";

/// Innertube client id of the Android app.
const ANDROID_CLIENT_ID: &str = "3";

/// Language the retrieval actually asks for.
///
/// The requested language wins if the page advertises it, then English, then
/// whatever the page lists first. With nothing advertised the request goes
/// out as asked and the endpoint decides.
pub fn select_language(requested: &str, available: &[LanguageTrack]) -> String {
    if available.is_empty() {
        return requested.to_string();
    }
    if available.iter().any(|t| t.language_code == requested) {
        return requested.to_string();
    }
    if available.iter().any(|t| t.language_code == "en") {
        return "en".to_string();
    }
    available[0].language_code.clone()
}

pub fn build_request_body(config: &EngineConfig, visitor_data: &str, params: &str) -> Value {
    json!({
        "context": {
            "client": {
                "clientName": "ANDROID",
                "clientVersion": config.android_client_version,
                "androidSdkVersion": config.android_sdk_version,
                "osName": "Android",
                "osVersion": config.android_os_version,
                "hl": "en",
                "visitorData": visitor_data,
            }
        },
        "params": params,
    })
}

pub fn build_request(config: &EngineConfig, visitor_data: &str, params: &str) -> HttpRequest {
    let body = build_request_body(config, visitor_data, params);
    let mut request = HttpRequest::post(GET_TRANSCRIPT_URL, body.to_string())
        .header("Content-Type", "application/json")
        .header("User-Agent", config.android_user_agent())
        .header("X-Youtube-Client-Name", ANDROID_CLIENT_ID)
        .header("X-Youtube-Client-Version", config.android_client_version.as_str());
    if !visitor_data.is_empty() {
        request = request.header("X-Goog-Visitor-Id", visitor_data);
    }
    request
}

/// POST the request and flatten the answer into transcript lines.
pub async fn fetch_transcript_lines<T: Transport + ?Sized>(
    transport: &T,
    config: &EngineConfig,
    visitor_data: &str,
    params: &str,
) -> Result<Vec<String>, TranscriptError> {
    let request = build_request(config, visitor_data, params);
    let response = transport.execute(request).await?;

    if !response.is_success() {
        // Innertube usually explains a 4xx in an `error` payload.
        if let Some(err) = upstream_error(&response.body) {
            return Err(err);
        }
        return Err(TranscriptError::network(
            Some(response.status),
            "transcript request failed",
        ));
    }

    parse_transcript_response(&response.body)
}

/// Where the segment list sits in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentPath {
    /// `updateEngagementPanelAction`, as returned to the web client.
    Web,
    /// `elementsCommand.transformEntityCommand`, as returned to the Android app.
    Android,
}

impl SegmentPath {
    pub const ORDER: [SegmentPath; 2] = [SegmentPath::Web, SegmentPath::Android];

    fn pointer(self) -> &'static str {
        match self {
            SegmentPath::Web => "/updateEngagementPanelAction/content/transcriptRenderer/content/transcriptSearchPanelRenderer/body/transcriptSegmentListRenderer/initialSegments",
            SegmentPath::Android => "/elementsCommand/transformEntityCommand/arguments/transformTranscriptSegmentListArguments/overwrite/initialSegments",
        }
    }

    /// Segments found under this path in any of the response actions.
    pub fn segments(self, response: &Value) -> &[Value] {
        response
            .get("actions")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|action| action.pointer(self.pointer()))
            .filter_map(Value::as_array)
            .find(|segments| !segments.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub fn parse_transcript_response(body: &str) -> Result<Vec<String>, TranscriptError> {
    let response: Value = serde_json::from_str(body)
        .map_err(|e| TranscriptError::MalformedResponse(e.to_string()))?;

    if let Some(err) = error_from_value(&response) {
        return Err(err);
    }

    for path in SegmentPath::ORDER {
        let segments = path.segments(&response);
        if segments.is_empty() {
            continue;
        }

        let lines: Vec<String> = segments.iter().filter_map(segment_text).collect();
        debug!(
            target: "engine.youtube",
            path = ?path,
            segments = segments.len(),
            lines = lines.len(),
            "located transcript segments"
        );
        if !lines.is_empty() {
            return Ok(lines);
        }
    }

    Err(TranscriptError::NoTranscriptAvailable)
}

/// Text of a single segment: the run list first, then the attributed string.
/// Header segments and blank cues yield `None`.
pub fn segment_text(segment: &Value) -> Option<String> {
    let snippet = segment.pointer("/transcriptSegmentRenderer/snippet")?;

    let from_runs = snippet
        .get("runs")
        .and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| run.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .and_then(clean_line);

    from_runs.or_else(|| {
        snippet
            .pointer("/elementsAttributedString/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .and_then(clean_line)
    })
}

fn clean_line(text: String) -> Option<String> {
    let decoded = html_escape::decode_html_entities(&text);
    let line = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

fn upstream_error(body: &str) -> Option<TranscriptError> {
    let value: Value = serde_json::from_str(body).ok()?;
    error_from_value(&value)
}

fn error_from_value(response: &Value) -> Option<TranscriptError> {
    let error = response.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| error.as_str().map(str::to_string))
        .unwrap_or_else(|| error.to_string());
    Some(TranscriptError::Upstream {
        code: error.get("code").and_then(Value::as_i64),
        message,
    })
}
