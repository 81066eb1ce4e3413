use crate::nba::params::*;
use anyhow::{anyhow, Result};
use log::{info, warn};
use polars::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::thread;
use std::time::{Duration, Instant};

const NBA_BASE_URL: &str = "https://stats.nba.com/stats";

pub const PLAY_BY_PLAY: &str = "PlayByPlay";
pub const GAME_FINDER_RESULTS: &str = "LeagueGameFinderResults";

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets")]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    name: String,
    headers: Vec<String>,
    #[serde(rename = "rowSet")]
    row_set: Vec<Vec<Value>>,
}

pub trait StatsEndpoint {
    fn endpoint_url(&self) -> String;

    fn send_request(&self) -> Result<Value> {
        fetch_nba_json(&self.endpoint_url())
    }

    /// One named result set of the response as a frame of string columns.
    fn load_frame(&self, result_set: &str) -> Result<DataFrame> {
        let json = self.send_request()?;
        result_set_frame(&json, result_set)
    }
}

pub struct PlayByPlayV2 {
    pub game_id: GameID,
    pub start_period: StartPeriod,
    pub end_period: EndPeriod,
}

impl PlayByPlayV2 {
    pub fn new(game_id: &str) -> Self {
        PlayByPlayV2 {
            game_id: GameID::ID(game_id.to_string()),
            start_period: StartPeriod::default(),
            end_period: EndPeriod::default(),
        }
    }
}

impl StatsEndpoint for PlayByPlayV2 {
    fn endpoint_url(&self) -> String {
        format!(
            "{}/playbyplayv2?{}&{}&{}",
            NBA_BASE_URL, self.game_id, self.start_period, self.end_period
        )
    }
}

pub struct LeagueGameFinder {
    pub league_id: LeagueID,
    pub season: Season,
    pub team_id: Option<TeamID>,
}

impl StatsEndpoint for LeagueGameFinder {
    fn endpoint_url(&self) -> String {
        let mut url = format!(
            "{}/leaguegamefinder?PlayerOrTeam=T&{}&{}",
            NBA_BASE_URL, self.league_id, self.season
        );
        if let Some(team) = &self.team_id {
            url.push_str(&format!("&{}", team));
        }
        url
    }
}

impl LeagueGameFinder {
    /// Distinct game ids in the order the finder lists them.
    pub fn game_ids(&self) -> Result<Vec<String>> {
        let games = self.load_frame(GAME_FINDER_RESULTS)?;
        let ids = games.column("GAME_ID")?.as_materialized_series().str()?.clone();
        let mut seen = Vec::new();
        for id in ids.into_iter().flatten() {
            if !seen.iter().any(|s: &String| s == id) {
                seen.push(id.to_string());
            }
        }
        Ok(seen)
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Converts the `resultSets` entry called `name` into a frame with one string
/// column per header. Strings keep leading zeros and numbers are rendered
/// as JSON prints them.
pub fn result_set_frame(json: &Value, name: &str) -> Result<DataFrame> {
    let response: StatsResponse = serde_json::from_value(json.clone())?;
    let set = response
        .result_sets
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| anyhow!("response has no result set named {}", name))?;
    let mut columns: Vec<Column> = Vec::with_capacity(set.headers.len());
    for (pos, header) in set.headers.iter().enumerate() {
        let values: Vec<Option<String>> = set
            .row_set
            .iter()
            .map(|row| row.get(pos).and_then(cell_text))
            .collect();
        columns.push(Column::new(header.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Pause before each request; the stats site throttles fast clients.
    pub delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            delay: Duration::from_secs(3),
        }
    }
}

/// Downloads the play-by-play of every game and stacks the rows. Games that
/// fail, come back empty, or carry a different header than the first game
/// are skipped with a warning.
pub fn fetch_games(game_ids: &[String], options: &FetchOptions) -> Result<DataFrame> {
    let load_start = Instant::now();
    let mut stacked: Option<DataFrame> = None;
    let mut fetched = 0;
    for (pos, game_id) in game_ids.iter().enumerate() {
        info!("{}/{} fetching play-by-play for game {}", pos + 1, game_ids.len(), game_id);
        if !options.delay.is_zero() {
            thread::sleep(options.delay);
        }
        let game = match PlayByPlayV2::new(game_id).load_frame(PLAY_BY_PLAY) {
            Ok(game) => game,
            Err(e) => {
                warn!("skipping game {}: {}", game_id, e);
                continue;
            }
        };
        if game.height() == 0 {
            warn!("game {} has no play-by-play rows, possibly a preseason game", game_id);
            continue;
        }
        match stacked.as_mut() {
            None => stacked = Some(game),
            Some(all) => {
                if all.get_column_names() != game.get_column_names() {
                    warn!("skipping game {}: its columns differ from the first game", game_id);
                    continue;
                }
                all.vstack_mut(&game)?;
            }
        }
        fetched += 1;
    }
    info!(
        "fetched {}/{} games in {:?}",
        fetched,
        game_ids.len(),
        load_start.elapsed()
    );
    stacked.ok_or_else(|| anyhow!("none of the {} games returned play-by-play rows", game_ids.len()))
}

fn fetch_nba_json(endpoint_url: &str) -> Result<Value> {
    let r = ureq::get(endpoint_url)
        .set("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:72.0) Gecko/20100101 Firefox/72.0")
        .set("Accept", "application/json, text/plain, */*")
        .set("Accept-Language", "en-US,en;q=0.5")
        .set("Connection", "keep-alive")
        .set("Origin", "https://www.nba.com")
        .set("Referer", "https://www.nba.com/")
        .set("Pragma", "no-cache")
        .set("Cache-Control", "no-cache")
        .timeout(Duration::from_secs(60))
        .call()?;
    Ok(r.into_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response() -> Value {
        json!({
            "resource": "playbyplay",
            "resultSets": [
                {
                    "name": "PlayByPlay",
                    "headers": ["GAME_ID", "EVENTNUM", "WCTIMESTRING", "HOMEDESCRIPTION"],
                    "rowSet": [
                        ["0021900001", 2, "8:11 PM", null],
                        ["0021900001", 4, "8:12 PM", "Jump Ball"]
                    ]
                },
                {"name": "AvailableVideo", "headers": ["VIDEO_AVAILABLE_FLAG"], "rowSet": [[1]]}
            ]
        })
    }

    #[test]
    fn result_set_becomes_string_frame() {
        let df = result_set_frame(&response(), PLAY_BY_PLAY).unwrap();
        assert_eq!(df.shape(), (2, 4));
        let ids = df.column("GAME_ID").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(ids.get(0), Some("0021900001"));
        let eventnums = df.column("EVENTNUM").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(eventnums.get(1), Some("4"));
        let home = df.column("HOMEDESCRIPTION").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(home.get(0), None);
    }

    #[test]
    fn missing_result_set_is_an_error() {
        assert!(result_set_frame(&response(), "BoxScore").is_err());
        assert!(result_set_frame(&json!({"message": "throttled"}), PLAY_BY_PLAY).is_err());
    }

    #[test]
    fn endpoint_urls() {
        let pbp = PlayByPlayV2::new("1021400001");
        assert_eq!(
            pbp.endpoint_url(),
            "https://stats.nba.com/stats/playbyplayv2?GameID=1021400001&StartPeriod=0&EndPeriod=0"
        );
        let finder = LeagueGameFinder {
            league_id: LeagueID::WNBA,
            season: Season::S("2014".to_string()),
            team_id: Some(TeamID::ID(1611661319)),
        };
        assert_eq!(
            finder.endpoint_url(),
            "https://stats.nba.com/stats/leaguegamefinder?PlayerOrTeam=T&LeagueID=10&Season=2014&TeamID=1611661319"
        );
    }
}
