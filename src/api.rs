use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::config::AppConfig;
use crate::games::{GametimesResponse, parse_gametimes_json};
use crate::http_client::http_client;
use crate::tally::{VoteTally, VoteTeam, parse_tally_json};

const GAMETIMES_PATH: &str = "api/gametimes";
const VOTES_PATH: &str = "api/votes";

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("vote rejected with http {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("vote request failed: {0}")]
    Transport(String),
    #[error("vote response was not a tally: {0}")]
    InvalidTally(String),
}

/// The three backend calls the page makes.
pub trait ShowtimeApi {
    fn fetch_games(&self) -> Result<GametimesResponse>;
    fn fetch_votes(&self) -> Result<VoteTally>;
    fn cast_vote(&self, team: VoteTeam) -> Result<VoteTally, VoteError>;
}

#[derive(Debug, Serialize)]
struct VoteRequest<'a> {
    team: &'a str,
}

pub struct HttpApi {
    client: &'static Client,
    gametimes_url: String,
    votes_url: String,
}

impl HttpApi {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = http_client(config.http_timeout)?;
        Ok(Self {
            client,
            gametimes_url: config.endpoint(GAMETIMES_PATH),
            votes_url: config.endpoint(VOTES_PATH),
        })
    }
}

impl ShowtimeApi for HttpApi {
    fn fetch_games(&self) -> Result<GametimesResponse> {
        let resp = self
            .client
            .get(&self.gametimes_url)
            .send()
            .context("gametimes request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading gametimes body")?;
        if !status.is_success() {
            log::warn!("gametimes returned http {status}");
        }

        let parsed = parse_gametimes_json(&body)?;
        if let Some(err) = parsed.error.as_deref() {
            log::warn!("gametimes backend error: {err}");
        }
        if let Some(message) = parsed.message.as_deref() {
            log::info!(
                "gametimes: {message} ({} games)",
                parsed.count.unwrap_or(parsed.games.len())
            );
        }
        Ok(parsed)
    }

    fn fetch_votes(&self) -> Result<VoteTally> {
        let resp = self
            .client
            .get(&self.votes_url)
            .send()
            .context("votes request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading votes body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        parse_tally_json(&body)
    }

    fn cast_vote(&self, team: VoteTeam) -> Result<VoteTally, VoteError> {
        let resp = self
            .client
            .post(&self.votes_url)
            .json(&VoteRequest {
                team: team.as_str(),
            })
            .send()
            .map_err(|err| VoteError::Transport(err.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| VoteError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(VoteError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        parse_tally_json(&body).map_err(|err| VoteError::InvalidTally(format!("{err:#}")))
    }
}
