#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use studyscribe_core::transport::{HttpRequest, HttpResponse, Method, Transport};
use studyscribe_core::TranscriptError;

pub const VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Replays one canned response per method and keeps every request it saw.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    pub page: Option<HttpResponse>,
    pub transcript: Option<HttpResponse>,
    /// Never answer the transcript POST.
    pub hang_transcript: bool,
    /// Never answer the watch page GET.
    pub hang_page: bool,
    pub seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new(page: HttpResponse, transcript: HttpResponse) -> Self {
        Self {
            page: Some(page),
            transcript: Some(transcript),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn posted_body(&self) -> Value {
        let post = self
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Post)
            .expect("no POST was sent");
        serde_json::from_str(post.body.as_deref().unwrap_or("")).unwrap()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TranscriptError> {
        self.seen.lock().unwrap().push(request.clone());
        let (hang, canned) = match request.method {
            Method::Get => (self.hang_page, &self.page),
            Method::Post => (self.hang_transcript, &self.transcript),
        };
        if hang {
            std::future::pending::<()>().await;
        }
        canned
            .clone()
            .ok_or_else(|| TranscriptError::network(None, "no scripted response"))
    }
}

pub fn watch_page(visitor_data: &str, languages: &[&str]) -> String {
    let tracks: Vec<Value> = languages
        .iter()
        .map(|code| {
            json!({
                "baseUrl": format!("https://www.youtube.com/api/timedtext?v={}&lang={}", VIDEO_ID, code),
                "name": { "simpleText": code },
                "languageCode": code,
            })
        })
        .collect();
    let player = json!({
        "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": tracks } },
        "videoDetails": { "videoId": VIDEO_ID, "title": "Test Video", "author": "Test Channel" },
    });
    format!(
        "<html><script>ytcfg.set({{\"INNERTUBE_CONTEXT\":{{\"client\":{{\"visitorData\":\"{}\"}}}}}});</script>\
         <script>var ytInitialPlayerResponse = {};</script></html>",
        visitor_data, player
    )
}

pub fn web_transcript(lines: &[&str]) -> String {
    let segments: Vec<Value> = lines
        .iter()
        .map(|text| {
            json!({ "transcriptSegmentRenderer": { "snippet": { "runs": [{ "text": text }] } } })
        })
        .collect();
    json!({
        "actions": [{
            "updateEngagementPanelAction": {
                "content": { "transcriptRenderer": { "content": {
                    "transcriptSearchPanelRenderer": { "body": {
                        "transcriptSegmentListRenderer": { "initialSegments": segments }
                    } }
                } } }
            }
        }]
    })
    .to_string()
}

pub fn android_transcript(lines: &[&str]) -> String {
    let segments: Vec<Value> = lines
        .iter()
        .map(|text| {
            json!({
                "transcriptSegmentRenderer": {
                    "snippet": { "elementsAttributedString": { "content": text } }
                }
            })
        })
        .collect();
    json!({
        "actions": [{
            "elementsCommand": { "transformEntityCommand": { "arguments": {
                "transformTranscriptSegmentListArguments": {
                    "overwrite": { "initialSegments": segments }
                }
            } } }
        }]
    })
    .to_string()
}
