use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::{CandidateId, Pair},
    error::{ApiError, ApiException},
    protocol::{PairResponse, VoteRequest},
};
use url::Url;

pub mod card;
pub mod config;
pub mod decision;
pub mod error;
pub mod gesture;
pub mod session;

pub use card::{Card, CardBuilder, CardId};
pub use config::SessionConfig;
pub use decision::{decide, Decision};
pub use error::PairSourceError;
pub use gesture::{GestureTracker, InputEvent, Leaning, PointerEvent, TouchEvent, TouchPoint};
pub use session::{
    RenderFrame, SessionController, SessionExit, SessionPhase, SessionState, UiCommand,
};

const PAIR_PATH: &str = "/api/votes/pair";
const VOTE_PATH: &str = "/api/votes/";

/// How the vote server answered a submission. Both outcomes count as success
/// for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteReceipt {
    Recorded,
    RateLimited,
}

#[async_trait]
pub trait PairSource: Send + Sync {
    async fn request_pair(&self) -> std::result::Result<Pair, PairSourceError>;
}

#[async_trait]
pub trait VoteSink: Send + Sync {
    async fn submit_vote(&self, winner: CandidateId, loser: CandidateId) -> Result<VoteReceipt>;
}

/// HTTP client for the vote server, serving as both pair source and vote
/// sink.
#[derive(Debug, Clone)]
pub struct HttpArenaClient {
    http: Client,
    pair_url: Url,
    vote_url: Url,
}

impl HttpArenaClient {
    pub fn new(base_url: Url) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Result<Self> {
        let pair_url = base_url
            .join(PAIR_PATH)
            .with_context(|| format!("invalid pair endpoint for '{base_url}'"))?;
        let vote_url = base_url
            .join(VOTE_PATH)
            .with_context(|| format!("invalid vote endpoint for '{base_url}'"))?;
        Ok(Self {
            http,
            pair_url,
            vote_url,
        })
    }
}

#[async_trait]
impl PairSource for HttpArenaClient {
    async fn request_pair(&self) -> std::result::Result<Pair, PairSourceError> {
        let res = self.http.get(self.pair_url.clone()).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            let err = ApiError::from_response(status.as_u16(), &body);
            return Err(PairSourceError::InsufficientCandidates(err.message));
        }
        if !status.is_success() {
            return Err(PairSourceError::Status(ApiError::from_response(
                status.as_u16(),
                &body,
            )));
        }

        let pair: Pair = serde_json::from_str::<PairResponse>(&body)?.into();
        if pair.is_degenerate() {
            return Err(PairSourceError::Malformed(format!(
                "candidate {} offered on both sides",
                pair.left.id
            )));
        }
        Ok(pair)
    }
}

#[async_trait]
impl VoteSink for HttpArenaClient {
    async fn submit_vote(&self, winner: CandidateId, loser: CandidateId) -> Result<VoteReceipt> {
        let res = self
            .http
            .post(self.vote_url.clone())
            .json(&VoteRequest {
                winner_id: winner,
                loser_id: loser,
            })
            .send()
            .await
            .context("vote submission failed")?;

        let status = res.status();
        if status.is_success() {
            return Ok(VoteReceipt::Recorded);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(VoteReceipt::RateLimited);
        }
        let body = res.text().await.unwrap_or_default();
        Err(ApiException::from(ApiError::from_response(status.as_u16(), &body)).into())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
