use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

pub const PLACEHOLDER_TEAM_IMAGE: &str = "/static/placeholder-team.png";
pub const NO_GAMES_MESSAGE: &str = "No games scheduled at this time.";
pub const GAMES_ERROR_MESSAGE: &str = "Failed to load games. Please try again later.";
pub const TEAMS_TBD: &str = "Teams TBD";

const TEAM_IMAGES: &[(&str, &str)] = &[
    (
        "Chiefs",
        "https://serpapi.com/searches/6791435cc2a5b143fe206802/images/16fc75e2607e2679d44b03632d85b1cfcc334782a233aa83c6c643c84cdc7ccef21b02cc1dbd409ae71bd233627e5e57.png",
    ),
    (
        "Bills",
        "https://serpapi.com/searches/6791435cc2a5b143fe206802/images/16fc75e2607e2679d44b03632d85b1cfcc334782a233aa83cdc75853bfe95aeafbdcd69b5dfe275131ae5f876cf63370.png",
    ),
    (
        "Eagles",
        "https://serpapi.com/searches/6791435cc2a5b143fe206802/images/16fc75e2607e2679d44b03632d85b1cfd78cd99fc631830000929c36bbc4e7119eace05b0dafc3b629af2587deabb4a9.png",
    ),
    (
        "Commanders",
        "https://serpapi.com/searches/6791435cc2a5b143fe206802/images/16fc75e2607e2679d44b03632d85b1cfd78cd99fc6318300dcd6528b575d2c337d298f48c43da95b81611f822bcf11d4.png",
    ),
];

pub fn team_image(name: &str) -> &'static str {
    TEAM_IMAGES
        .iter()
        .find(|(team, _)| *team == name)
        .map(|(_, url)| *url)
        .unwrap_or(PLACEHOLDER_TEAM_IMAGE)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

impl Team {
    pub fn image(&self) -> &'static str {
        team_image(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub venue: String,
    #[serde(default)]
    pub tournament: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teams: Vec<Team>,
}

impl Game {
    /// Both sides of the game, only when exactly two teams are known.
    pub fn matchup(&self) -> Option<(&Team, &Team)> {
        match self.teams.as_slice() {
            [home, away] => Some((home, away)),
            _ => None,
        }
    }

    pub fn tournament_label(&self) -> Option<&str> {
        self.tournament.as_deref().filter(|t| !t.is_empty())
    }
}

/// Body of `GET api/gametimes`. On backend failure only `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GametimesResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub games: Vec<Game>,
    #[serde(default)]
    pub error: Option<String>,
}

pub fn parse_gametimes_json(raw: &str) -> Result<GametimesResponse> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(GametimesResponse::default());
    }
    serde_json::from_str(trimmed).context("invalid gametimes json")
}

/// What the games container currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamesView {
    Loading,
    Cards(Vec<Game>),
    NoGames,
    Failed,
}

impl GamesView {
    pub fn from_fetch(result: &Result<GametimesResponse>) -> Self {
        match result {
            Ok(resp) if !resp.games.is_empty() => GamesView::Cards(resp.games.clone()),
            Ok(_) => GamesView::NoGames,
            Err(_) => GamesView::Failed,
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            GamesView::NoGames => Some(NO_GAMES_MESSAGE),
            GamesView::Failed => Some(GAMES_ERROR_MESSAGE),
            GamesView::Loading | GamesView::Cards(_) => None,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_team_uses_placeholder() {
        assert_eq!(team_image("Ravens"), PLACEHOLDER_TEAM_IMAGE);
        assert_ne!(team_image("Eagles"), PLACEHOLDER_TEAM_IMAGE);
    }

    #[test]
    fn blank_tournament_is_hidden() {
        let game = Game {
            tournament: Some(String::new()),
            ..Game::default()
        };
        assert_eq!(game.tournament_label(), None);
    }
}
