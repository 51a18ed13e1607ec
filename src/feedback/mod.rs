//! Narrative feedback for recorded intervals.
//!
//! Generating the text is the job of a remote model behind a relay. This module only defines the
//! seam ([FeedbackGenerator]), the data that crosses it and the fan out over record views.

pub mod prompt;
pub mod request;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::recorder::{entities::AudioClip, reconcile::RecordView};

/// How many requests are allowed to be in flight at the same time.
const MAX_CONCURRENT_REQUESTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub prompt_text: String,
    pub audio: AudioClip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub narrative_text: String,
}

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("quota exhausted: {0}")]
    Quota(String),

    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Anything able to turn a prompt and a clip into narrative text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, request: FeedbackRequest) -> Result<Feedback, FeedbackError>;
}

#[derive(Debug)]
pub struct RecordFeedback {
    pub view: RecordView,
    pub result: Result<Feedback, FeedbackError>,
}

/// Requests feedback for every view that carries audio, one request per view. Results come back
/// in the order of `views`. Views without audio are skipped.
pub async fn collect_feedback(
    views: impl IntoIterator<Item = RecordView>,
    generator: &dyn FeedbackGenerator,
    prompt_text: &str,
) -> Vec<RecordFeedback> {
    let with_audio = views.into_iter().filter_map(|view| match view.audio() {
        Some(audio) => {
            let request = FeedbackRequest {
                prompt_text: prompt_text.to_string(),
                audio: audio.clone(),
            };
            Some((view, request))
        }
        None => {
            debug!("Skipping {} {} without audio", view.category, view.start);
            None
        }
    });

    stream::iter(with_audio)
        .map(|(view, request)| async move {
            let result = generator.generate(request).await;
            match &result {
                Ok(_) => info!("Received feedback for {} {}", view.category, view.start),
                Err(e) => error!("Feedback for {} {} failed: {e}", view.category, view.start),
            }
            RecordFeedback { view, result }
        })
        .buffered(MAX_CONCURRENT_REQUESTS)
        .collect()
        .await
}
