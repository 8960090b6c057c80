mod common;

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use common::{FakeApi, VoteReply, read_fixture};
use sports_showtime::api::VoteError;
use sports_showtime::feed::spawn_provider;
use sports_showtime::games::GamesView;
use sports_showtime::page::{VOTE_FAILED_ALERT, VoteEligibility};
use sports_showtime::state::{AppState, Delta, ProviderCommand, apply_delta};
use sports_showtime::tally::{VoteTally, VoteTeam};
use sports_showtime::vote_flag::MemoryVoteFlag;

fn fresh_state() -> AppState {
    AppState::new(Box::new(MemoryVoteFlag::default()))
}

#[test]
fn failed_vote_delta_raises_alert() {
    let mut state = fresh_state();
    let ticket = state.request_vote(VoteTeam::Bills).expect("eligible");

    apply_delta(
        &mut state,
        Delta::VoteFinished {
            ticket,
            result: Err(VoteError::Rejected {
                status: 500,
                body: "{}".to_string(),
            }),
        },
    );

    assert_eq!(state.alert.as_deref(), Some(VOTE_FAILED_ALERT));
    assert!(!state.page.has_voted());
    assert!(state.dismiss_alert());
    assert!(state.alert.is_none());
    assert!(state.request_vote(VoteTeam::Bills).is_some());
}

#[test]
fn repeated_vote_request_is_a_noop_while_in_flight() {
    let mut state = fresh_state();
    assert!(state.request_vote(VoteTeam::Chiefs).is_some());
    assert!(state.request_vote(VoteTeam::Chiefs).is_none());
    assert_eq!(
        state.page.eligibility(),
        VoteEligibility::InFlight(VoteTeam::Chiefs)
    );
    assert!(state.logs.back().is_some_and(|l| l.contains("still in flight")));
}

#[test]
fn load_deltas_arrive_in_any_order() {
    let mut state = fresh_state();
    apply_delta(
        &mut state,
        Delta::VotesLoaded(Ok(VoteTally::from_counts([3, 1, 0, 0]))),
    );
    assert!(state.page.view().loading_visible);
    apply_delta(&mut state, Delta::GamesLoaded(Err(anyhow::anyhow!("dns"))));

    let view = state.page.view();
    assert!(!view.loading_visible);
    assert_eq!(view.games, GamesView::Failed);
    assert_eq!(view.total_votes, 4);
    assert!(state.logs.iter().any(|l| l.contains("Games fetch error")));
}

#[test]
fn selection_wraps_around() {
    let mut state = fresh_state();
    state.select_prev();
    assert_eq!(state.selected(), VoteTeam::Commanders);
    state.select_next();
    assert_eq!(state.selected(), VoteTeam::Chiefs);
}

#[test]
fn provider_runs_loads_and_votes() {
    let api = FakeApi::new()
        .with_games(&read_fixture("gametimes.json"))
        .with_votes(&read_fixture("votes.json"))
        .with_vote_reply(VoteReply::Ok(
            r#"{"Chiefs":4,"Bills":1,"Eagles":0,"Commanders":0}"#,
        ));
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(Arc::new(api), tx, cmd_rx);

    let mut state = fresh_state();
    for _ in 0..2 {
        let delta = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("load delta");
        apply_delta(&mut state, delta);
    }
    assert!(matches!(state.page.view().games, GamesView::Cards(_)));
    assert_eq!(state.page.view().total_votes, 4);

    let ticket = state.request_vote(VoteTeam::Chiefs).expect("eligible");
    cmd_tx.send(ProviderCommand::CastVote(ticket)).unwrap();
    let delta = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("vote delta");
    apply_delta(&mut state, delta);

    assert!(state.page.has_voted());
    assert_eq!(state.page.tally(), VoteTally::from_counts([4, 1, 0, 0]));
    assert!(state.alert.is_none());
}
