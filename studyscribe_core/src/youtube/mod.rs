// src/youtube/mod.rs

pub mod innertube;
pub mod page;
pub mod proto;

use serde::Serialize;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{Stage, TranscriptError};
use crate::transport::{ReqwestTransport, Transport};
use crate::video_id::VideoId;

pub use innertube::{select_language, SegmentPath};
pub use page::{LanguageTrack, VideoMetadata, WatchPage};
pub use proto::TranscriptRequest;

/// Outcome of one successful retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptResult {
    pub video_id: VideoId,
    pub language: String,
    pub lines: Vec<String>,
    pub metadata: VideoMetadata,
}

impl TranscriptResult {
    /// Flat transcript, lines separated by single spaces.
    pub fn joined(&self) -> String {
        self.lines.join(" ")
    }

    /// Rough token count used for quota accounting (`chars / 4`).
    pub fn estimated_tokens(&self) -> u64 {
        estimate_tokens(&self.joined())
    }
}

pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() / 4) as u64
}

/// Transcript acquisition: watch page, then `get_transcript`.
///
/// Stateless between calls; share one engine across tasks freely.
#[derive(Debug, Clone)]
pub struct TranscriptEngine<T> {
    transport: T,
    config: EngineConfig,
}

impl TranscriptEngine<ReqwestTransport> {
    pub fn with_defaults() -> Result<Self, TranscriptError> {
        Ok(Self::new(ReqwestTransport::new()?, EngineConfig::default()))
    }
}

impl<T: Transport> TranscriptEngine<T> {
    pub fn new(transport: T, config: EngineConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch the transcript for a URL or bare id in the requested language
    /// (or the configured default).
    pub async fn fetch(
        &self,
        input: &str,
        language: Option<&str>,
    ) -> Result<TranscriptResult, TranscriptError> {
        let video_id = VideoId::parse(input)?;
        let requested = language.unwrap_or(&self.config.default_language);
        self.fetch_video(&video_id, requested).await
    }

    pub async fn fetch_video(
        &self,
        video_id: &VideoId,
        requested: &str,
    ) -> Result<TranscriptResult, TranscriptError> {
        let started = Instant::now();
        let page = self.watch_page(video_id).await?;

        let language = select_language(requested, &page.languages);
        if language != requested {
            debug!(
                target: "engine.youtube",
                video_id = %video_id,
                requested,
                selected = %language,
                "requested language not advertised, falling back"
            );
        }

        let params = TranscriptRequest::new(video_id.clone(), language.clone()).encode_params();
        let lines = self
            .bounded(
                Stage::Transcript,
                innertube::fetch_transcript_lines(
                    &self.transport,
                    &self.config,
                    &page.visitor_data,
                    &params,
                ),
            )
            .await?;

        info!(
            target: "engine.youtube",
            video_id = %video_id,
            language = %language,
            lines = lines.len(),
            elapsed_ms = %started.elapsed().as_millis(),
            "fetched transcript"
        );

        Ok(TranscriptResult {
            video_id: video_id.clone(),
            language,
            lines,
            metadata: page.metadata,
        })
    }

    /// Only the watch page stage: token, languages and metadata.
    pub async fn watch_page(&self, video_id: &VideoId) -> Result<WatchPage, TranscriptError> {
        self.bounded(
            Stage::WatchPage,
            page::fetch_watch_page(&self.transport, &self.config, video_id),
        )
        .await
    }

    /// Runs one network leg under the configured ceiling. On expiry the
    /// in-flight future is dropped, which aborts the request.
    async fn bounded<F, R>(&self, stage: Stage, leg: F) -> Result<R, TranscriptError>
    where
        F: Future<Output = Result<R, TranscriptError>>,
    {
        let after = self.config.timeout();
        match tokio::time::timeout(after, leg).await {
            Ok(result) => result,
            Err(_) => Err(TranscriptError::Timeout { stage, after }),
        }
    }
}
