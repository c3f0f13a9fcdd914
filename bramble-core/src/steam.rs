use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono_tz::America::New_York;
use log::warn;
use serde::{Deserialize, Serialize};
use tera::{to_value, Value};

const OWNED_GAMES_URL: &str = "https://api.steampowered.com/IPlayerService/GetOwnedGames/v1/";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum SteamError {
    MissingKey,
    Http(reqwest::Error),
}

impl fmt::Display for SteamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SteamError::MissingKey => write!(f, "STEAM_API_KEY is not set"),
            SteamError::Http(err) => write!(f, "steam request failed: {}", err),
        }
    }
}

impl Error for SteamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SteamError::MissingKey => None,
            SteamError::Http(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for SteamError {
    fn from(err: reqwest::Error) -> Self {
        SteamError::Http(err)
    }
}

/// One owned game as Steam reports it. `playtime_deck_forever` arrives in
/// minutes and is rewritten to hours during processing; `last_played` is
/// filled in from the epoch stamp at the same time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnedGame {
    pub appid: u32,
    pub name: String,
    #[serde(default)]
    pub img_icon_url: String,
    #[serde(default)]
    pub playtime_forever: f64,
    #[serde(default)]
    pub playtime_windows_forever: f64,
    #[serde(default)]
    pub playtime_mac_forever: f64,
    #[serde(default)]
    pub playtime_linux_forever: f64,
    #[serde(default)]
    pub playtime_deck_forever: f64,
    #[serde(default)]
    pub rtime_last_played: i64,
    #[serde(default, skip_deserializing)]
    pub last_played: String,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    response: OwnedGamesBody,
}

// A private profile comes back as `{"response": {}}`.
#[derive(Debug, Default, Deserialize)]
struct OwnedGamesBody {
    #[serde(default)]
    games: Vec<OwnedGame>,
}

#[derive(Debug, Clone, Default)]
pub struct SteamClient {
    api_key: Option<String>,
}

impl SteamClient {
    /// Key from `STEAM_API_KEY`; an unset or empty variable leaves the
    /// client keyless, which every fetch reports as `MissingKey`.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("STEAM_API_KEY").ok().filter(|key| !key.is_empty()),
        }
    }

    pub fn with_key<S: Into<String>>(key: S) -> Self {
        Self {
            api_key: Some(key.into()),
        }
    }

    /// Fetch the full owned-games list for one account, unprocessed.
    pub fn owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>, SteamError> {
        let key = self.api_key.as_deref().ok_or(SteamError::MissingKey)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;
        let response: OwnedGamesResponse = http
            .get(OWNED_GAMES_URL)
            .query(&[
                ("key", key),
                ("steamid", steam_id),
                ("include_appinfo", "true"),
                ("include_extended_appinfo", "true"),
                ("include_played_free_games", "true"),
                ("include_free_sub", "true"),
                ("skip_unvetted_apps", "true"),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.response.games)
    }

    /// The most-played deck games, at most 50, most played first. Every
    /// failure path degrades to an empty list so a bad fetch can never
    /// take a build down with it.
    pub fn deck_top_50(&self, steam_id: &str) -> Vec<OwnedGame> {
        match self.owned_games(steam_id) {
            Ok(games) => rank_deck_games(games),
            Err(err) => {
                warn!("steam deck list unavailable: {}", err);
                Vec::new()
            }
        }
    }
}

fn rank_deck_games(mut games: Vec<OwnedGame>) -> Vec<OwnedGame> {
    process_owned_games(&mut games);
    games.retain(|game| game.playtime_deck_forever > 0.0);
    games.sort_by(|a, b| b.playtime_deck_forever.total_cmp(&a.playtime_deck_forever));
    games.truncate(50);
    games
}

fn process_owned_games(games: &mut [OwnedGame]) {
    for game in games {
        game.playtime_deck_forever = round2(game.playtime_deck_forever / 60.0);
        game.last_played = format_last_played(game.rtime_last_played);
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Dates read as the site's east-coast anchor, same as currentEasternTime.
fn format_last_played(epoch: i64) -> String {
    DateTime::from_timestamp(epoch, 0)
        .map(|stamp| stamp.with_timezone(&New_York).format("%B %-d %Y").to_string())
        .unwrap_or_default()
}

/// Template function `steam_deck_top_50(steam_id=...)`. Returns an array
/// of game records; a missing argument degrades to an empty array like
/// every other failure here.
pub fn top_50_fn(client: SteamClient) -> impl tera::Function {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let Some(steam_id) = args
            .get("steam_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
        else {
            warn!("steam_deck_top_50 called without a steam_id");
            return Ok(Value::Array(Vec::new()));
        };
        Ok(to_value(client.deck_top_50(steam_id))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Function;

    fn game(name: &str, deck_minutes: f64, rtime: i64) -> OwnedGame {
        OwnedGame {
            name: name.to_string(),
            playtime_deck_forever: deck_minutes,
            rtime_last_played: rtime,
            ..OwnedGame::default()
        }
    }

    #[test]
    fn missing_key_degrades_to_empty() {
        let client = SteamClient::default();
        assert!(client.deck_top_50("76561197988460908").is_empty());
        assert!(matches!(
            client.owned_games("76561197988460908").unwrap_err(),
            SteamError::MissingKey
        ));
    }

    #[test]
    fn ranking_filters_sorts_and_formats() {
        // 16:00 UTC keeps the eastern date on the same day.
        let games = vec![
            game("shelved", 0.0, 1609516800),
            game("second", 100.0, 1609516800),
            game("first", 90000.0, 1609516800),
        ];
        let ranked = rank_deck_games(games);

        let names: Vec<&str> = ranked.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(ranked[0].playtime_deck_forever, 1500.0);
        assert_eq!(ranked[1].playtime_deck_forever, 1.67);
        assert_eq!(ranked[0].last_played, "January 1 2021");
    }

    #[test]
    fn ranking_caps_at_fifty() {
        let games: Vec<OwnedGame> = (0..60)
            .map(|i| game(&format!("game-{}", i), 60.0 + i as f64, 0))
            .collect();
        assert_eq!(rank_deck_games(games).len(), 50);
    }

    #[test]
    fn template_fn_without_argument_yields_empty_array() {
        let func = top_50_fn(SteamClient::default());
        let result = func.call(&HashMap::new()).unwrap();
        assert_eq!(result, Value::Array(Vec::new()));
    }

    #[test]
    fn response_with_no_games_parses() {
        let parsed: OwnedGamesResponse = serde_json::from_str("{\"response\": {}}").unwrap();
        assert!(parsed.response.games.is_empty());
    }

    #[test]
    fn game_records_parse_from_steam_shape() {
        let parsed: OwnedGame = serde_json::from_str(
            "{\"appid\": 570, \"name\": \"Dota 2\", \"playtime_deck_forever\": 42, \
             \"rtime_last_played\": 1609516800, \"img_icon_url\": \"abc123\"}",
        )
        .unwrap();
        assert_eq!(parsed.appid, 570);
        assert_eq!(parsed.playtime_deck_forever, 42.0);
        assert_eq!(parsed.last_played, "");
    }
}
