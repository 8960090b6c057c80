//! HTML rendering of the page. All game fields go through askama's
//! auto-escaping; only the static image table is inserted raw.

use anyhow::{Context, Result};
use askama::Template;

use crate::games::{Game, GamesView};
use crate::page::{PageView, TeamRow};

struct CardSide<'a> {
    name: &'a str,
    image: &'static str,
}

struct Matchup<'a> {
    home: CardSide<'a>,
    away: CardSide<'a>,
}

#[derive(Template)]
#[template(path = "game_card.html")]
struct GameCardTemplate<'a> {
    date: &'a str,
    time: &'a str,
    venue: &'a str,
    matchup: Option<Matchup<'a>>,
    tournament: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    loading_visible: bool,
    games_html: String,
    total_votes: u64,
    rows: &'a [TeamRow],
}

pub fn render_game_card(game: &Game) -> Result<String> {
    let matchup = game.matchup().map(|(home, away)| Matchup {
        home: CardSide {
            name: &home.name,
            image: home.image(),
        },
        away: CardSide {
            name: &away.name,
            image: away.image(),
        },
    });
    GameCardTemplate {
        date: &game.date,
        time: &game.time,
        venue: &game.venue,
        matchup,
        tournament: game.tournament_label(),
    }
    .render()
    .context("render game card")
}

/// Content of the games container for the given state.
pub fn render_games(view: &GamesView) -> Result<String> {
    match view {
        GamesView::Loading => Ok(String::new()),
        GamesView::Cards(games) => {
            let cards = games
                .iter()
                .map(render_game_card)
                .collect::<Result<Vec<_>>>()?;
            Ok(cards.join(""))
        }
        GamesView::NoGames => Ok(format!(
            r#"<div class="no-games">{}</div>"#,
            crate::games::NO_GAMES_MESSAGE
        )),
        GamesView::Failed => Ok(format!(
            r#"<div class="error">{}</div>"#,
            crate::games::GAMES_ERROR_MESSAGE
        )),
    }
}

pub fn render_page(view: &PageView) -> Result<String> {
    PageTemplate {
        loading_visible: view.loading_visible,
        games_html: render_games(&view.games)?,
        total_votes: view.total_votes,
        rows: &view.teams,
    }
    .render()
    .context("render page")
}
