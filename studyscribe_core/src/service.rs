//! Transport-agnostic request handler in front of the engine.
//!
//! Order of checks: authentication, rate limit, input, quota, then the engine.
//! Every outcome becomes a [`ServiceReply`] carrying the status code and the
//! JSON body the HTTP layer sends back.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::Authenticator;
use crate::error::TranscriptError;
use crate::rate_limit::RateLimiter;
use crate::transport::Transport;
use crate::usage::{UsageLedger, TRANSCRIPT_FEATURE};
use crate::video_id::VideoId;
use crate::youtube::{TranscriptEngine, VideoMetadata};

/// Budget reserved before a call, since the transcript length is not known yet.
pub const DEFAULT_TOKEN_BUDGET: u64 = 4_000;

/// Query parameters of a transcript request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptQuery {
    pub video: Option<String>,
    pub language: Option<String>,
}

impl TranscriptQuery {
    /// Reads `v` (or `videoId`) and `lang`; blank values count as absent.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let non_blank = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            video: non_blank("v").or_else(|| non_blank("videoId")),
            language: non_blank("lang"),
        }
    }

    pub fn from_query_string(query: &str) -> Self {
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self::from_params(&params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Success {
        transcript: String,
        metadata: VideoMetadata,
        success: bool,
    },
    Failure {
        error: String,
        transcript: String,
        success: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl ServiceReply {
    fn success(transcript: String, metadata: VideoMetadata) -> Self {
        Self {
            status: 200,
            body: ReplyBody::Success {
                transcript,
                metadata,
                success: true,
            },
        }
    }

    fn failure(err: &TranscriptError) -> Self {
        Self {
            status: err.http_status(),
            body: ReplyBody::Failure {
                error: user_message(err),
                transcript: String::new(),
                success: false,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

fn user_message(err: &TranscriptError) -> String {
    match err {
        TranscriptError::InvalidVideoIdentifier(input) if input.is_empty() => {
            "Missing video id (use the `v` or `videoId` parameter)".to_string()
        }
        TranscriptError::InvalidVideoIdentifier(_) => "Invalid YouTube video id or URL".to_string(),
        // Already human readable.
        TranscriptError::Upstream { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

pub struct TranscriptService<T> {
    engine: TranscriptEngine<T>,
    auth: Arc<dyn Authenticator>,
    limiter: Arc<dyn RateLimiter>,
    ledger: UsageLedger,
    token_budget: u64,
}

impl<T: Transport> TranscriptService<T> {
    pub fn new(
        engine: TranscriptEngine<T>,
        auth: Arc<dyn Authenticator>,
        limiter: Arc<dyn RateLimiter>,
        ledger: UsageLedger,
    ) -> Self {
        Self {
            engine,
            auth,
            limiter,
            ledger,
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }

    pub fn with_token_budget(mut self, token_budget: u64) -> Self {
        self.token_budget = token_budget;
        self
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub async fn handle(&self, bearer: Option<&str>, query: &TranscriptQuery) -> ServiceReply {
        match self.try_handle(bearer, query).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(
                    target: "service.transcript",
                    code = err.code_str(),
                    status = err.http_status(),
                    error = %err,
                    "transcript request failed"
                );
                ServiceReply::failure(&err)
            }
        }
    }

    async fn try_handle(
        &self,
        bearer: Option<&str>,
        query: &TranscriptQuery,
    ) -> Result<ServiceReply, TranscriptError> {
        let identity = self.auth.authenticate(bearer)?;

        if !self.limiter.check_and_increment(identity.as_str()) {
            return Err(TranscriptError::RateLimited);
        }

        let input = query
            .video
            .as_deref()
            .ok_or_else(|| TranscriptError::InvalidVideoIdentifier(String::new()))?;
        let video_id = VideoId::parse(input)?;

        if !self
            .ledger
            .is_under_limit(identity.as_str(), self.token_budget)?
        {
            return Err(TranscriptError::QuotaExceeded);
        }

        let language = query
            .language
            .as_deref()
            .unwrap_or(&self.engine.config().default_language);
        let result = self.engine.fetch_video(&video_id, language).await?;
        let transcript = result.joined();
        let tokens = result.estimated_tokens();

        // Recorded after the fact; a ledger failure does not cost the caller the transcript.
        match self
            .ledger
            .record_usage(identity.as_str(), TRANSCRIPT_FEATURE, 0, tokens)
        {
            Ok(()) => debug!(
                target: "service.transcript",
                identity = %identity,
                video_id = %result.video_id,
                tokens,
                "recorded usage"
            ),
            Err(e) => warn!(
                target: "service.transcript",
                identity = %identity,
                error = %e,
                "could not record usage"
            ),
        }

        Ok(ServiceReply::success(transcript, result.metadata))
    }
}
