// src/lib.rs
pub mod auth;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod service;
pub mod transport;
pub mod usage;
pub mod video_id;
pub mod youtube;

pub use crate::auth::{AnonymousAuthenticator, Authenticator, CallerIdentity, StaticTokenAuthenticator};
pub use crate::config::EngineConfig;
pub use crate::error::{Stage, TranscriptError};
pub use crate::rate_limit::{FixedWindowRateLimiter, RateLimiter, Unlimited};
pub use crate::service::{ServiceReply, TranscriptQuery, TranscriptService};
pub use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use crate::usage::{UsageLedger, UsageRecord, UsageStore};
pub use crate::video_id::VideoId;
pub use crate::youtube::{TranscriptEngine, TranscriptResult, VideoMetadata};

/// One-shot retrieval with the default transport and configuration.
pub async fn fetch_transcript(
    input: &str,
    language: Option<&str>,
) -> Result<TranscriptResult, TranscriptError> {
    TranscriptEngine::with_defaults()?.fetch(input, language).await
}
