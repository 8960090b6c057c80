#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use sports_showtime::api::{ShowtimeApi, VoteError};
use sports_showtime::games::{GametimesResponse, parse_gametimes_json};
use sports_showtime::tally::{VoteTally, VoteTeam, parse_tally_json};

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Reply to a queued vote: a tally body on success or an http status on rejection.
pub enum VoteReply {
    Ok(&'static str),
    Status(u16),
}

/// In-memory backend. `None` bodies behave like a refused connection.
#[derive(Default)]
pub struct FakeApi {
    games_body: Option<String>,
    votes_body: Option<String>,
    vote_replies: Mutex<VecDeque<VoteReply>>,
    pub vote_calls: Mutex<Vec<VoteTeam>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_games(mut self, body: &str) -> Self {
        self.games_body = Some(body.to_string());
        self
    }

    pub fn with_votes(mut self, body: &str) -> Self {
        self.votes_body = Some(body.to_string());
        self
    }

    pub fn with_vote_reply(self, reply: VoteReply) -> Self {
        self.vote_replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn vote_calls(&self) -> Vec<VoteTeam> {
        self.vote_calls.lock().unwrap().clone()
    }
}

impl ShowtimeApi for FakeApi {
    fn fetch_games(&self) -> Result<GametimesResponse> {
        match &self.games_body {
            Some(body) => parse_gametimes_json(body),
            None => Err(anyhow!("connection refused")),
        }
    }

    fn fetch_votes(&self) -> Result<VoteTally> {
        match &self.votes_body {
            Some(body) => parse_tally_json(body),
            None => Err(anyhow!("connection refused")),
        }
    }

    fn cast_vote(&self, team: VoteTeam) -> Result<VoteTally, VoteError> {
        self.vote_calls.lock().unwrap().push(team);
        match self.vote_replies.lock().unwrap().pop_front() {
            Some(VoteReply::Ok(body)) => {
                parse_tally_json(body).map_err(|err| VoteError::InvalidTally(err.to_string()))
            }
            Some(VoteReply::Status(status)) => Err(VoteError::Rejected {
                status,
                body: r#"{"error":"Invalid team"}"#.to_string(),
            }),
            None => Err(VoteError::Transport("connection refused".to_string())),
        }
    }
}
