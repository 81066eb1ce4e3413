use chrono::NaiveDateTime;
use log::{info, warn};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::path::Path;

use super::error::{PbpError, Result};
use super::events::{Descriptions, EventType};
use super::season;
use super::wallclock::{self, WallClock};

pub const GAME_ID: &str = "GAME_ID";
pub const WCTIMESTRING: &str = "WCTIMESTRING";

const EVENTNUM: &[&str] = &["EVENTNUM"];
const EVENTMSGTYPE: &[&str] = &["EVENTMSGTYPE"];
const PERIOD: &[&str] = &["PERIOD", "QTR"];
const GAME_CLOCK: &[&str] = &["PCTIMESTRING", "clock"];
const SCORE: &[&str] = &["SCORE"];
const HOME_DESC: &[&str] = &["HOMEDESCRIPTION"];
const NEUTRAL_DESC: &[&str] = &["NEUTRALDESCRIPTION"];
const VISITOR_DESC: &[&str] = &["VISITORDESCRIPTION"];
const SEASON: &[&str] = &["season", "_year"];
const EVENT_DATETIME: &[&str] = &["EVENT_DATETIME", "EVENT_DT"];
const START_TIME: &[&str] = &["start_time"];
const END_TIME: &[&str] = &["end_time"];
const TEAM_ABBREVIATIONS: [&str; 3] = [
    "PLAYER1_TEAM_ABBREVIATION",
    "PLAYER2_TEAM_ABBREVIATION",
    "PLAYER3_TEAM_ABBREVIATION",
];

/// Reads a CSV with every column as a string. Ids keep their leading zeros
/// and messy cells are parsed later by whoever needs them.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;
    info!(
        "read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    info!("wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|c| c.to_string()).collect()
}

/// First alias present in the frame, compared case-insensitively.
pub fn resolve_column(df: &DataFrame, aliases: &[&str]) -> Option<String> {
    let names = column_names(df);
    aliases.iter().find_map(|alias| {
        names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(alias))
            .cloned()
    })
}

pub fn require_column(df: &DataFrame, name: &str) -> Result<String> {
    resolve_column(df, &[name]).ok_or_else(|| PbpError::MissingColumn(name.to_string()))
}

/// Trimmed cell values of a column; blank cells become `None`.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

/// Like `string_values` but an absent column reads as all blanks.
pub fn optional_values(df: &DataFrame, aliases: &[&str]) -> Result<Vec<Option<String>>> {
    match resolve_column(df, aliases) {
        Some(name) => string_values(df, &name),
        None => Ok(vec![None; df.height()]),
    }
}

/// Integer cell, accepting float renderings such as `3.0`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Game ids written through a float column come back as `1029700010.0`.
pub fn normalize_game_id(raw: &str) -> String {
    let id = raw.trim();
    id.strip_suffix(".0").unwrap_or(id).to_string()
}

#[derive(Debug, Clone, Default)]
pub struct PlayEvent {
    pub game_id: String,
    pub eventnum: Option<i64>,
    pub event_type: Option<i64>,
    pub period: Option<i64>,
    pub wctimestring: Option<String>,
    pub wall_clock: Option<WallClock>,
    /// Full date and time, when the feed has an `EVENT_DATETIME` column.
    pub timestamp: Option<NaiveDateTime>,
    /// Raw `start_time` / `end_time` cells of feeds that carry them per row.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub game_clock: Option<String>,
    pub score: Option<String>,
    pub descriptions: Descriptions,
    /// `PLAYER1..3_TEAM_ABBREVIATION`, by column.
    pub team_abbreviations: [Option<String>; 3],
    pub season: Option<i32>,
}

impl PlayEvent {
    pub fn is(&self, kind: EventType) -> bool {
        self.event_type.and_then(EventType::from_code) == Some(kind)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Game {
    pub game_id: String,
    pub events: Vec<PlayEvent>,
}

impl Game {
    pub fn new(game_id: &str) -> Self {
        Game {
            game_id: game_id.to_string(),
            events: Vec::new(),
        }
    }

    /// Season of the first event that has one.
    pub fn season(&self) -> Option<i32> {
        self.events.iter().find_map(|e| e.season)
    }

    pub fn has_event_types(&self) -> bool {
        self.events.iter().any(|e| e.event_type.is_some())
    }

    pub fn max_period(&self) -> Option<i64> {
        self.events.iter().filter_map(|e| e.period).max()
    }

    pub fn sorted_by<K: Ord, F: Fn(&PlayEvent) -> K>(&self, key: F) -> Vec<PlayEvent> {
        let mut events = self.events.clone();
        events.sort_by_key(|e| key(e));
        events
    }
}

/// Splits a play-by-play frame into games, in order of first appearance.
/// Rows keep their file order inside each game.
pub fn games(df: &DataFrame) -> Result<Vec<Game>> {
    let game_col = require_column(df, GAME_ID)?;
    let game_ids = string_values(df, &game_col)?;
    let eventnums = optional_values(df, EVENTNUM)?;
    let event_types = optional_values(df, EVENTMSGTYPE)?;
    let periods = optional_values(df, PERIOD)?;
    let mut wctimes = optional_values(df, &[WCTIMESTRING])?;
    let mut game_clocks = optional_values(df, GAME_CLOCK)?;
    let mut scores = optional_values(df, SCORE)?;
    let home = optional_values(df, HOME_DESC)?;
    let neutral = optional_values(df, NEUTRAL_DESC)?;
    let visitor = optional_values(df, VISITOR_DESC)?;
    let seasons = optional_values(df, SEASON)?;
    let mut timestamps = EVENT_DATETIME
        .iter()
        .map(|c| optional_values(df, &[*c]))
        .collect::<Result<Vec<_>>>()?;
    let mut start_times = optional_values(df, START_TIME)?;
    let mut end_times = optional_values(df, END_TIME)?;
    let mut teams = TEAM_ABBREVIATIONS
        .iter()
        .map(|c| optional_values(df, &[*c]))
        .collect::<Result<Vec<_>>>()?;

    let mut games: Vec<Game> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0;
    for (row, game_id) in game_ids.into_iter().enumerate() {
        let game_id = match game_id {
            Some(id) => normalize_game_id(&id),
            None => {
                skipped += 1;
                continue;
            }
        };
        let wctimestring = wctimes[row].take();
        let wall_clock = wctimestring.as_deref().and_then(WallClock::parse);
        let descriptions = Descriptions::new(
            home[row].as_deref(),
            neutral[row].as_deref(),
            visitor[row].as_deref(),
        );
        let timestamp = timestamps
            .iter()
            .find_map(|t| t[row].as_deref().and_then(wallclock::parse_datetime));
        let event = PlayEvent {
            eventnum: eventnums[row].as_deref().and_then(parse_int),
            event_type: event_types[row].as_deref().and_then(parse_int),
            period: periods[row].as_deref().and_then(parse_int),
            wctimestring,
            wall_clock,
            timestamp,
            start_time: start_times[row].take(),
            end_time: end_times[row].take(),
            game_clock: game_clocks[row].take(),
            score: scores[row].take(),
            descriptions,
            team_abbreviations: [teams[0][row].take(), teams[1][row].take(), teams[2][row].take()],
            season: season::resolve(seasons[row].as_deref(), &game_id),
            game_id: game_id.clone(),
        };
        let slot = *slots.entry(game_id).or_insert_with(|| {
            games.push(Game::new(&event.game_id));
            games.len() - 1
        });
        games[slot].events.push(event);
    }
    if skipped > 0 {
        warn!("skipped {} rows without a {}", skipped, GAME_ID);
    }
    info!("found {} games", games.len());
    Ok(games)
}

/// Keeps the rows whose game id is (or, with `keep == false`, is not) in
/// `ids`. Rows without a game id are always dropped.
pub fn retain_games(df: &DataFrame, ids: &HashSet<String>, keep: bool) -> Result<DataFrame> {
    let game_col = require_column(df, GAME_ID)?;
    let mask: BooleanChunked = string_values(df, &game_col)?
        .iter()
        .map(|id| {
            id.as_deref()
                .map_or(false, |id| ids.contains(&normalize_game_id(id)) == keep)
        })
        .collect();
    Ok(df.filter(&mask)?)
}
