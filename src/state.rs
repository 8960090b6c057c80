use std::collections::VecDeque;

use anyhow::Result;
use chrono::Local;

use crate::api::VoteError;
use crate::games::GametimesResponse;
use crate::page::{PageController, VoteEligibility, VoteOutcome, VoteTicket};
use crate::tally::{VoteTally, VoteTeam};
use crate::vote_flag::VoteFlagStore;

const MAX_LOGS: usize = 200;

/// Results coming back from the worker threads.
#[derive(Debug)]
pub enum Delta {
    GamesLoaded(Result<GametimesResponse>),
    VotesLoaded(Result<VoteTally>),
    VoteFinished {
        ticket: VoteTicket,
        result: Result<VoteTally, VoteError>,
    },
    Log(String),
}

#[derive(Debug)]
pub enum ProviderCommand {
    CastVote(VoteTicket),
}

pub struct AppState {
    pub page: PageController,
    pub selected_team: usize,
    pub alert: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub games_scroll: u16,
}

impl AppState {
    pub fn new(flag: Box<dyn VoteFlagStore>) -> Self {
        let mut state = Self {
            page: PageController::new(flag),
            selected_team: 0,
            alert: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            games_scroll: 0,
        };
        if state.page.has_voted() {
            state.push_log("[INFO] Vote already cast from this machine");
        }
        state
    }

    pub fn selected(&self) -> VoteTeam {
        VoteTeam::ALL[self.selected_team % VoteTeam::ALL.len()]
    }

    pub fn select_next(&mut self) {
        self.selected_team = (self.selected_team + 1) % VoteTeam::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected_team = (self.selected_team + VoteTeam::ALL.len() - 1) % VoteTeam::ALL.len();
    }

    /// Runs the eligibility check for a vote action. `None` means the action was a no-op.
    pub fn request_vote(&mut self, team: VoteTeam) -> Option<VoteTicket> {
        match self.page.begin_vote(team) {
            Ok(ticket) => {
                self.push_log(format!("[INFO] Casting vote for {team}"));
                Some(ticket)
            }
            Err(VoteEligibility::InFlight(pending)) => {
                self.push_log(format!("[INFO] Vote for {pending} still in flight"));
                None
            }
            Err(_) => {
                self.push_log("[INFO] Already voted");
                None
            }
        }
    }

    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::GamesLoaded(result) => {
            match &result {
                Ok(resp) => state.push_log(format!("[INFO] Loaded {} games", resp.games.len())),
                Err(err) => state.push_log(format!("[WARN] Games fetch error: {err:#}")),
            }
            state.page.apply_games(result);
        }
        Delta::VotesLoaded(result) => {
            match &result {
                Ok(tally) => state.push_log(format!("[INFO] Loaded {} votes", tally.total())),
                Err(err) => state.push_log(format!("[WARN] Votes fetch error: {err:#}")),
            }
            state.page.apply_votes(result);
        }
        Delta::VoteFinished { ticket, result } => {
            let team = ticket.team();
            match state.page.finish_vote(ticket, result) {
                VoteOutcome::Accepted(_) => {
                    state.push_log(format!("[INFO] Vote for {team} recorded"));
                }
                VoteOutcome::Failed { alert } => {
                    state.push_log(format!("[WARN] Vote for {team} failed"));
                    state.alert = Some(alert.to_string());
                }
                VoteOutcome::Ignored(_) => {}
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
