//! Data quality flags per game: implausible lengths, odd period counts,
//! game clocks running backwards and scores going down.

use log::info;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::describe::{quantile, sorted};
use super::error::Result;
use super::events::EventType;
use super::frame::{self, Game, GAME_ID};
use super::wallclock::{forward_delta_secs, parse_datetime, wall_span_secs, WallClock};

pub const GAME_FLAGS_FILE: &str = "game_flags.csv";
pub const EVENT_ANOMALIES_FILE: &str = "event_anomalies.csv";

const MIN_PERIODS: i64 = 4;
const MAX_PERIODS: i64 = 6;
const MAX_TIMEOUTS: u32 = 8;
const IQR_FENCE: f64 = 1.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFlags {
    pub game_id: String,
    pub game_duration_minutes: Option<f64>,
    pub periods_observed_max: Option<i64>,
    pub clock_regressions: u32,
    pub score_drops: u32,
    pub timeouts_total: u32,
    pub duration_outlier_low: bool,
    pub duration_outlier_high: bool,
    pub periods_outlier: bool,
    pub timeouts_outlier: bool,
    pub clock_anomaly: bool,
    pub score_anomaly: bool,
    pub has_any_anomaly: bool,
}

/// `MM:SS` game clock in seconds.
pub fn clock_seconds(raw: &str) -> Option<i64> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    Some(minutes.parse::<i64>().ok()? * 60 + seconds.parse::<i64>().ok()?)
}

/// Higher side of a `"12 - 10"` style score. Anything without exactly two
/// numbers is unreadable.
pub fn score_max(raw: &str) -> Option<i64> {
    let numbers: Vec<i64> = raw
        .split(|c: char| !c.is_ascii_digit())
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse().ok())
        .collect();
    match numbers.as_slice() {
        [a, b] => Some(*a.max(b)),
        _ => None,
    }
}

/// Rows per period where the game clock goes up instead of down.
fn clock_regressions(game: &Game) -> u32 {
    let mut last: HashMap<i64, i64> = HashMap::new();
    let mut regressions = 0;
    for event in &game.events {
        let (period, secs) = match (event.period, event.game_clock.as_deref().and_then(clock_seconds)) {
            (Some(p), Some(s)) => (p, s),
            _ => continue,
        };
        if let Some(prev) = last.insert(period, secs) {
            if secs > prev {
                regressions += 1;
            }
        }
    }
    regressions
}

/// Rows whose leading score is below the highest one seen so far.
fn score_drops(game: &Game) -> u32 {
    let mut running = -1;
    let mut drops = 0;
    for score in game.events.iter().filter_map(|e| e.score.as_deref().and_then(score_max)) {
        if score < running {
            drops += 1;
        }
        running = running.max(score);
    }
    drops
}

fn timeouts_total(game: &Game) -> u32 {
    game.events
        .iter()
        .filter(|e| e.is(EventType::Timeout) || e.descriptions.team_mentions("timeout"))
        .count() as u32
}

/// Earliest `start_time` to latest `end_time`. Full timestamps win; cells
/// holding only a time of day run from the first start to the last end.
fn start_end_secs(game: &Game) -> Option<i64> {
    let starts: Vec<&str> = game.events.iter().filter_map(|e| e.start_time.as_deref()).collect();
    let ends: Vec<&str> = game.events.iter().filter_map(|e| e.end_time.as_deref()).collect();
    let first = starts.iter().filter_map(|s| parse_datetime(s)).min();
    let last = ends.iter().filter_map(|s| parse_datetime(s)).max();
    if let (Some(first), Some(last)) = (first, last) {
        return Some((last - first).num_seconds());
    }
    let first = starts.iter().find_map(|s| WallClock::parse(s))?;
    let last = ends.iter().rev().find_map(|s| WallClock::parse(s))?;
    Some(forward_delta_secs(first, last))
}

fn timestamp_secs(game: &Game) -> Option<i64> {
    let first = game.events.iter().filter_map(|e| e.timestamp).min()?;
    let last = game.events.iter().filter_map(|e| e.timestamp).max()?;
    Some((last - first).num_seconds())
}

/// Game length from the `start_time`/`end_time` columns, else the event
/// timestamps, else the wall clock span.
fn duration_minutes(game: &Game) -> Option<f64> {
    let wall: Vec<WallClock> = game.events.iter().filter_map(|e| e.wall_clock).collect();
    let secs = start_end_secs(game)
        .or_else(|| timestamp_secs(game))
        .or_else(|| wall_span_secs(&wall))
        .filter(|s| *s >= 0)?;
    Some(secs as f64 / 60.0)
}

/// Raw measurements of one game, before any flag that needs the other games.
pub fn measure_game(game: &Game) -> GameFlags {
    let periods_observed_max = game.max_period();
    let clock_regressions = clock_regressions(game);
    let score_drops = score_drops(game);
    let timeouts_total = timeouts_total(game);
    GameFlags {
        game_id: game.game_id.clone(),
        game_duration_minutes: duration_minutes(game),
        periods_observed_max,
        clock_regressions,
        score_drops,
        timeouts_total,
        periods_outlier: periods_observed_max.map_or(false, |p| p < MIN_PERIODS || p > MAX_PERIODS),
        timeouts_outlier: timeouts_total > MAX_TIMEOUTS,
        clock_anomaly: clock_regressions > 0,
        score_anomaly: score_drops > 0,
        ..Default::default()
    }
}

/// Tukey fences over every known duration.
pub fn iqr_bounds(durations: &[f64]) -> Option<(f64, f64)> {
    let sorted = sorted(durations);
    if sorted.is_empty() {
        return None;
    }
    let (q1, q3) = (quantile(&sorted, 0.25), quantile(&sorted, 0.75));
    let iqr = q3 - q1;
    Some((q1 - IQR_FENCE * iqr, q3 + IQR_FENCE * iqr))
}

pub fn flag_games(games: &[Game]) -> Vec<GameFlags> {
    let mut flags: Vec<GameFlags> = games.iter().map(measure_game).collect();
    let durations: Vec<f64> = flags.iter().filter_map(|f| f.game_duration_minutes).collect();
    let fences = iqr_bounds(&durations);
    if let Some((low, high)) = fences {
        info!("duration fences: {:.1} .. {:.1} minutes", low, high);
    }
    for f in flags.iter_mut() {
        if let (Some((low, high)), Some(d)) = (fences, f.game_duration_minutes) {
            f.duration_outlier_low = d < low;
            f.duration_outlier_high = d > high;
        }
        f.has_any_anomaly = f.duration_outlier_low
            || f.duration_outlier_high
            || f.periods_outlier
            || f.timeouts_outlier
            || f.clock_anomaly
            || f.score_anomaly;
    }
    flags
}

pub fn flags_frame(rows: &[GameFlags]) -> Result<DataFrame> {
    let bools = |name: &str, get: fn(&GameFlags) -> bool| {
        Column::new(name.into(), rows.iter().map(get).collect::<Vec<bool>>())
    };
    let df = DataFrame::new(vec![
        Column::new(GAME_ID.into(), rows.iter().map(|f| f.game_id.clone()).collect::<Vec<String>>()),
        Column::new("game_duration_minutes".into(), rows.iter().map(|f| f.game_duration_minutes).collect::<Vec<_>>()),
        Column::new("periods_observed_max".into(), rows.iter().map(|f| f.periods_observed_max).collect::<Vec<_>>()),
        Column::new("clock_regressions".into(), rows.iter().map(|f| f.clock_regressions).collect::<Vec<u32>>()),
        Column::new("score_drops".into(), rows.iter().map(|f| f.score_drops).collect::<Vec<u32>>()),
        Column::new("timeouts_total".into(), rows.iter().map(|f| f.timeouts_total).collect::<Vec<u32>>()),
        bools("duration_outlier_low", |f| f.duration_outlier_low),
        bools("duration_outlier_high", |f| f.duration_outlier_high),
        bools("periods_outlier", |f| f.periods_outlier),
        bools("timeouts_outlier", |f| f.timeouts_outlier),
        bools("clock_anomaly", |f| f.clock_anomaly),
        bools("score_anomaly", |f| f.score_anomaly),
        bools("has_any_anomaly", |f| f.has_any_anomaly),
    ])?;
    Ok(df)
}

pub struct AnomalyReport {
    pub flags: Vec<GameFlags>,
    /// Every play-by-play row of the games with at least one anomaly.
    pub events: DataFrame,
}

impl AnomalyReport {
    pub fn anomalous_games(&self) -> usize {
        self.flags.iter().filter(|f| f.has_any_anomaly).count()
    }

    /// Writes both tables into `outdir` and returns their paths.
    pub fn write(&mut self, outdir: &Path) -> Result<(PathBuf, PathBuf)> {
        let flags_path = outdir.join(GAME_FLAGS_FILE);
        let events_path = outdir.join(EVENT_ANOMALIES_FILE);
        frame::write_csv(&mut flags_frame(&self.flags)?, &flags_path)?;
        frame::write_csv(&mut self.events, &events_path)?;
        Ok((flags_path, events_path))
    }
}

pub fn flag_anomalies(pbp: &DataFrame) -> Result<AnomalyReport> {
    let games = frame::games(pbp)?;
    let flags = flag_games(&games);
    let anomalous: HashSet<String> = flags
        .iter()
        .filter(|f| f.has_any_anomaly)
        .map(|f| f.game_id.clone())
        .collect();
    info!("{} of {} games have at least one anomaly", anomalous.len(), flags.len());
    let events = frame::retain_games(pbp, &anomalous, true)?;
    Ok(AnomalyReport { flags, events })
}
