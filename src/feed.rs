use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::api::ShowtimeApi;
use crate::state::{Delta, ProviderCommand};

/// Starts the two page-load reads in parallel and a worker for vote commands.
/// Results arrive on `tx` in whatever order the backend answers.
pub fn spawn_provider<A>(api: Arc<A>, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>)
where
    A: ShowtimeApi + Send + Sync + 'static,
{
    {
        let api = Arc::clone(&api);
        let tx = tx.clone();
        thread::spawn(move || {
            let _ = tx.send(Delta::GamesLoaded(api.fetch_games()));
        });
    }
    {
        let api = Arc::clone(&api);
        let tx = tx.clone();
        thread::spawn(move || {
            let _ = tx.send(Delta::VotesLoaded(api.fetch_votes()));
        });
    }

    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::CastVote(ticket) => {
                    let result = api.cast_vote(ticket.team());
                    if let Err(err) = &result {
                        let _ = tx.send(Delta::Log(format!("[WARN] Vote request: {err}")));
                    }
                    if tx.send(Delta::VoteFinished { ticket, result }).is_err() {
                        break;
                    }
                }
            }
        }
    });
}
