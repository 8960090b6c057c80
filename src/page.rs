//! Page controller: owns the tally, the vote flag and every display region.
//!
//! Nothing here performs I/O on its own except through the [`ShowtimeApi`]
//! and [`VoteFlagStore`] handed to it, so the terminal UI can run the network
//! calls on worker threads and feed the results back in.

use anyhow::Result;

use crate::api::{ShowtimeApi, VoteError};
use crate::games::{GamesView, GametimesResponse};
use crate::tally::{VoteTally, VoteTeam};
use crate::vote_flag::VoteFlagStore;

pub const VOTE_LABEL: &str = "Vote";
pub const VOTED_LABEL: &str = "Voted";
pub const VOTE_FAILED_ALERT: &str = "Failed to cast vote. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteButton {
    pub enabled: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRow {
    pub team: VoteTeam,
    /// Progress bar width in percent.
    pub bar_width: u8,
    pub percentage_label: String,
    pub button: VoteButton,
}

impl TeamRow {
    fn idle(team: VoteTeam) -> Self {
        Self {
            team,
            bar_width: 0,
            percentage_label: "0%".to_string(),
            button: VoteButton {
                enabled: true,
                label: VOTE_LABEL.to_string(),
            },
        }
    }
}

/// Everything the page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub loading_visible: bool,
    pub games: GamesView,
    pub total_votes: u64,
    pub teams: [TeamRow; 4],
}

impl PageView {
    pub fn row(&self, team: VoteTeam) -> &TeamRow {
        &self.teams[team.index()]
    }
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            loading_visible: true,
            games: GamesView::Loading,
            total_votes: 0,
            teams: VoteTeam::ALL.map(TeamRow::idle),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteEligibility {
    Eligible,
    InFlight(VoteTeam),
    Locked,
}

/// Proof that a vote was admitted by [`PageController::begin_vote`].
#[derive(Debug, PartialEq, Eq)]
pub struct VoteTicket {
    team: VoteTeam,
}

impl VoteTicket {
    pub fn team(&self) -> VoteTeam {
        self.team
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The action was a no-op; no request was made.
    Ignored(VoteEligibility),
    Accepted(VoteTally),
    Failed { alert: &'static str },
}

pub struct PageController {
    tally: VoteTally,
    flag: Box<dyn VoteFlagStore>,
    has_voted: bool,
    in_flight: Option<VoteTeam>,
    games_settled: bool,
    view: PageView,
}

impl PageController {
    pub fn new(flag: Box<dyn VoteFlagStore>) -> Self {
        let has_voted = flag.is_set();
        let mut controller = Self {
            tally: VoteTally::new(),
            flag,
            has_voted,
            in_flight: None,
            games_settled: false,
            view: PageView::default(),
        };
        controller.update_vote_display();
        controller
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn tally(&self) -> VoteTally {
        self.tally
    }

    pub fn has_voted(&self) -> bool {
        self.has_voted
    }

    pub fn eligibility(&self) -> VoteEligibility {
        if self.has_voted {
            VoteEligibility::Locked
        } else if let Some(team) = self.in_flight {
            VoteEligibility::InFlight(team)
        } else {
            VoteEligibility::Eligible
        }
    }

    /// Fetches both data sets one after the other. Used where no worker threads exist.
    pub fn initialize(&mut self, api: &dyn ShowtimeApi) {
        self.apply_games(api.fetch_games());
        self.apply_votes(api.fetch_votes());
    }

    /// Settles the games container and hides the loading indicator.
    /// Only the first settlement counts; the schedule is never refetched.
    pub fn apply_games(&mut self, result: Result<GametimesResponse>) {
        if self.games_settled {
            log::warn!("ignoring repeated games result");
            return;
        }
        if let Err(err) = &result {
            log::error!("error fetching games: {err:#}");
        }
        self.view.games = GamesView::from_fetch(&result);
        self.view.loading_visible = false;
        self.games_settled = true;
    }

    pub fn apply_votes(&mut self, result: Result<VoteTally>) {
        match result {
            Ok(tally) => self.tally = tally,
            Err(err) => log::error!("error loading votes: {err:#}"),
        }
        self.update_vote_display();
    }

    /// Recomputes the total, bars, labels and buttons from the tally and flag.
    pub fn update_vote_display(&mut self) {
        self.view.total_votes = self.tally.total();
        for team in VoteTeam::ALL {
            let pct = self.tally.percentage(team);
            let row = &mut self.view.teams[team.index()];
            row.bar_width = pct;
            row.percentage_label = format!("{pct}%");
        }
        if self.has_voted {
            self.lock_buttons();
        }
    }

    /// Admits a vote if the page is eligible, taking the in-flight lock before any request.
    pub fn begin_vote(&mut self, team: VoteTeam) -> Result<VoteTicket, VoteEligibility> {
        match self.eligibility() {
            VoteEligibility::Eligible => {
                self.in_flight = Some(team);
                Ok(VoteTicket { team })
            }
            other => Err(other),
        }
    }

    pub fn finish_vote(
        &mut self,
        ticket: VoteTicket,
        result: Result<VoteTally, VoteError>,
    ) -> VoteOutcome {
        if self.in_flight == Some(ticket.team) {
            self.in_flight = None;
        }
        match result {
            Ok(tally) => {
                self.tally = tally;
                if let Err(err) = self.flag.set() {
                    log::error!("failed to persist vote flag: {err:#}");
                }
                self.has_voted = true;
                self.update_vote_display();
                self.lock_buttons();
                log::info!("vote for {} recorded", ticket.team);
                VoteOutcome::Accepted(tally)
            }
            Err(err) => {
                log::error!("error casting vote for {}: {err}", ticket.team);
                VoteOutcome::Failed {
                    alert: VOTE_FAILED_ALERT,
                }
            }
        }
    }

    /// Full click handler: eligibility check, request, reconciliation.
    pub fn submit_vote(&mut self, api: &dyn ShowtimeApi, team: VoteTeam) -> VoteOutcome {
        let ticket = match self.begin_vote(team) {
            Ok(ticket) => ticket,
            Err(state) => return VoteOutcome::Ignored(state),
        };
        let result = api.cast_vote(team);
        self.finish_vote(ticket, result)
    }

    fn lock_buttons(&mut self) {
        for row in &mut self.view.teams {
            row.button.enabled = false;
            row.button.label = VOTED_LABEL.to_string();
        }
    }
}
