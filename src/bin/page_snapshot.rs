use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use sports_showtime::api::HttpApi;
use sports_showtime::config::AppConfig;
use sports_showtime::html::render_page;
use sports_showtime::page::{PageController, VoteOutcome};
use sports_showtime::tally::VoteTeam;
use sports_showtime::vote_flag::{FileVoteFlag, MemoryVoteFlag, VoteFlagStore};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = AppConfig::from_env();
    let api = HttpApi::new(&config)?;
    let flag: Box<dyn VoteFlagStore> = match config
        .vote_flag_path
        .clone()
        .map(FileVoteFlag::new)
        .or_else(FileVoteFlag::at_default_location)
    {
        Some(flag) => Box::new(flag),
        None => Box::new(MemoryVoteFlag::default()),
    };

    let mut page = PageController::new(flag);
    page.initialize(&api);

    if let Some(name) = arg_value("--vote") {
        let team = VoteTeam::from_name(&name).ok_or_else(|| anyhow!("unknown team {name:?}"))?;
        match page.submit_vote(&api, team) {
            VoteOutcome::Accepted(tally) => eprintln!("Vote for {team} recorded ({} total)", tally.total()),
            VoteOutcome::Failed { alert } => eprintln!("{alert}"),
            VoteOutcome::Ignored(state) => eprintln!("Vote ignored: {state:?}"),
        }
    }

    let html = render_page(page.view())?;
    match arg_value("--out") {
        Some(path) => {
            let path = PathBuf::from(path);
            fs::write(&path, html).with_context(|| format!("write {}", path.display()))?;
            eprintln!("Page written to {}", path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
