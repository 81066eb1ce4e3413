//! Per-game summaries and removal of games whose wall clock span is not a
//! believable game length.

use log::{info, warn};
use polars::prelude::*;
use std::collections::HashSet;
use tabled::{Table, Tabled};

use super::error::Result;
use super::frame::{self, Game, GAME_ID, WCTIMESTRING};
use super::metrics::DurationBounds;
use super::wallclock::forward_delta_secs;

#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub game_id: String,
    pub teams: String,
    pub periods: i64,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_min: Option<f64>,
    pub row_count: usize,
}

impl GameSummary {
    pub fn is_outlier(&self, bounds: &DurationBounds) -> bool {
        !bounds.contains(self.duration_min)
    }
}

#[derive(Tabled)]
struct OutlierRow {
    game_id: String,
    teams: String,
    periods: i64,
    start: String,
    end: String,
    minutes: String,
    rows: usize,
}

impl From<&GameSummary> for OutlierRow {
    fn from(s: &GameSummary) -> Self {
        OutlierRow {
            game_id: s.game_id.clone(),
            teams: s.teams.clone(),
            periods: s.periods,
            start: s.start_time.clone().unwrap_or_default(),
            end: s.end_time.clone().unwrap_or_default(),
            minutes: s.duration_min.map(|d| format!("{:.1}", d)).unwrap_or_default(),
            rows: s.row_count,
        }
    }
}

/// The two most frequent team abbreviations as `"A @ B"`. Counting runs
/// down each abbreviation column in turn and ties keep the one seen first.
fn guess_teams(game: &Game) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let by_column = (0..3).flat_map(|c| {
        game.events
            .iter()
            .filter_map(move |e| e.team_abbreviations[c].as_ref())
    });
    for abbr in by_column {
        match counts.iter_mut().find(|(t, _)| t == abbr) {
            Some((_, n)) => *n += 1,
            None => counts.push((abbr.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    match counts.as_slice() {
        [] => String::new(),
        [(only, _)] => only.clone(),
        [(first, _), (second, _), ..] => format!("{} @ {}", first, second),
    }
}

pub fn summarize_game(game: &Game) -> GameSummary {
    let timed: Vec<_> = game
        .events
        .iter()
        .filter_map(|e| e.wall_clock.map(|wc| (e, wc)))
        .collect();
    let first = timed.first();
    let last = timed.last();
    let duration_min = match (first, last) {
        (Some((_, a)), Some((_, b))) => Some(forward_delta_secs(*a, *b) as f64 / 60.0),
        _ => None,
    };
    GameSummary {
        game_id: game.game_id.clone(),
        teams: guess_teams(game),
        periods: game.max_period().unwrap_or(0),
        start_time: first.and_then(|(e, _)| e.wctimestring.clone()),
        end_time: last.and_then(|(e, _)| e.wctimestring.clone()),
        duration_min,
        row_count: game.events.len(),
    }
}

pub fn summary_frame(rows: &[GameSummary]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(GAME_ID.into(), rows.iter().map(|s| s.game_id.clone()).collect::<Vec<String>>()),
        Column::new("teams".into(), rows.iter().map(|s| s.teams.clone()).collect::<Vec<String>>()),
        Column::new("periods".into(), rows.iter().map(|s| s.periods).collect::<Vec<i64>>()),
        Column::new("start_time_str".into(), rows.iter().map(|s| s.start_time.clone()).collect::<Vec<Option<String>>>()),
        Column::new("end_time_str".into(), rows.iter().map(|s| s.end_time.clone()).collect::<Vec<Option<String>>>()),
        Column::new("duration_min".into(), rows.iter().map(|s| s.duration_min).collect::<Vec<Option<f64>>>()),
        Column::new("row_count".into(), rows.iter().map(|s| s.row_count as u32).collect::<Vec<u32>>()),
    ])?;
    Ok(df)
}

pub struct OutlierReport {
    pub summaries: Vec<GameSummary>,
    pub outliers: Vec<GameSummary>,
    /// Play-by-play rows of the games that survived.
    pub cleaned: DataFrame,
}

impl OutlierReport {
    /// The first `limit` outliers as a printable table.
    pub fn outlier_table(&self, limit: usize) -> String {
        let rows: Vec<OutlierRow> = self.outliers.iter().take(limit).map(OutlierRow::from).collect();
        Table::new(rows).to_string()
    }
}

pub fn remove_outliers(pbp: &DataFrame, bounds: &DurationBounds) -> Result<OutlierReport> {
    frame::require_column(pbp, WCTIMESTRING)?;
    let games = frame::games(pbp)?;
    let summaries: Vec<GameSummary> = games.iter().map(summarize_game).collect();
    let outliers: Vec<GameSummary> = summaries
        .iter()
        .filter(|s| s.is_outlier(bounds))
        .cloned()
        .collect();
    let untimed = outliers.iter().filter(|s| s.duration_min.is_none()).count();
    if untimed > 0 {
        warn!("{} games have no parsable {} and count as outliers", untimed, WCTIMESTRING);
    }
    info!(
        "bounds [{}]: {} outlier games of {}",
        bounds,
        outliers.len(),
        summaries.len()
    );
    let bad_ids: HashSet<String> = outliers.iter().map(|s| s.game_id.clone()).collect();
    let cleaned = frame::retain_games(pbp, &bad_ids, false)?;
    info!("kept {} play-by-play rows", cleaned.height());
    Ok(OutlierReport {
        summaries,
        outliers,
        cleaned,
    })
}
