//! Per-game timing metrics and their season averages.
//!
//! Two heuristics are available. `Markers` scans for loose marker phrases
//! and keeps only lengths inside plausible windows. `Boundaries` anchors on
//! the "Start/End of Nth Period" rows over a wall clock made monotonic across
//! midnight, and prefers `EVENTMSGTYPE` codes for free throws and fouls.

use log::{info, warn};
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;

use super::error::{PbpError, Result};
use super::events::{self, Boundary, EventType};
use super::frame::{self, Game, PlayEvent, GAME_ID};
use super::wallclock::{monotonic_seconds, signed_delta_secs, WallClock};

/// Plausible spans in seconds for the marker heuristic.
const TIMEOUT_WINDOW: (i64, i64) = (15, 300);
const REPLAY_WINDOW: (i64, i64) = (5, 180);
const HALFTIME_WINDOW: (i64, i64) = (120, 1800);
const FOURTH_WINDOW: (i64, i64) = (60, 7200);

/// Per-game column and the season table header it averages into.
const SEASON_COLUMNS: [(&str, &str); 10] = [
    ("game_duration_min", "Average Game Duration (min)"),
    ("challenges", "Average Challenges Per Game"),
    ("timeouts", "Average Timeouts Per Game"),
    ("avg_timeout_len_sec", "Average Timeout Length (seconds)"),
    ("replays", "Average Replays Per Game"),
    ("avg_replay_len_sec", "Average Replay Length (seconds)"),
    ("halftime_len_min", "Average Halftime Length (minutes)"),
    ("free_throws", "Free Throws Per Game"),
    ("q4_len_min", "4th Quarter Length (minutes)"),
    ("fouls", "Average Fouls Per Game"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    Markers,
    Boundaries,
}

impl Default for Heuristic {
    fn default() -> Self {
        Heuristic::Boundaries
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markers" => Ok(Heuristic::Markers),
            "boundaries" => Ok(Heuristic::Boundaries),
            other => Err(format!("unknown heuristic '{}', use markers or boundaries", other)),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Heuristic::Markers => write!(f, "markers"),
            Heuristic::Boundaries => write!(f, "boundaries"),
        }
    }
}

/// Inclusive game duration range in minutes, written `lower,upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBounds {
    pub lower: f64,
    pub upper: f64,
}

impl DurationBounds {
    pub const fn new(lower: f64, upper: f64) -> Self {
        DurationBounds { lower, upper }
    }

    pub fn contains(&self, minutes: Option<f64>) -> bool {
        minutes.map_or(false, |m| m >= self.lower && m <= self.upper)
    }
}

impl Default for DurationBounds {
    fn default() -> Self {
        DurationBounds::new(90.0, 180.0)
    }
}

impl FromStr for DurationBounds {
    type Err = PbpError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PbpError::InvalidBounds(s.to_string());
        let (lower, upper) = s.split_once(',').ok_or_else(invalid)?;
        let lower = frame::parse_float(lower).ok_or_else(invalid)?;
        let upper = frame::parse_float(upper).ok_or_else(invalid)?;
        if lower > upper {
            return Err(invalid());
        }
        Ok(DurationBounds::new(lower, upper))
    }
}

impl fmt::Display for DurationBounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.lower, self.upper)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameMetrics {
    pub game_id: String,
    pub season: Option<i32>,
    pub game_duration_min: Option<f64>,
    pub challenges: u32,
    pub timeouts: u32,
    pub avg_timeout_len_sec: Option<f64>,
    pub replays: u32,
    pub avg_replay_len_sec: Option<f64>,
    pub halftime_len_min: Option<f64>,
    pub free_throws: u32,
    pub q4_len_min: Option<f64>,
    pub fouls: u32,
}

pub fn game_metrics(game: &Game, heuristic: Heuristic) -> GameMetrics {
    match heuristic {
        Heuristic::Markers => marker_metrics(game),
        Heuristic::Boundaries => boundary_metrics(game),
    }
}

fn flags(events: &[PlayEvent], patterns: &[&str]) -> Vec<bool> {
    events
        .iter()
        .map(|e| e.descriptions.mentions_any(patterns))
        .collect()
}

fn count(mask: &[bool]) -> u32 {
    mask.iter().filter(|m| **m).count() as u32
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn first_flagged_time(events: &[PlayEvent], mask: &[bool]) -> Option<WallClock> {
    events
        .iter()
        .zip(mask)
        .filter(|(_, m)| **m)
        .find_map(|(e, _)| e.wall_clock)
}

fn last_flagged_time(events: &[PlayEvent], mask: &[bool]) -> Option<WallClock> {
    events
        .iter()
        .zip(mask)
        .rev()
        .filter(|(_, m)| **m)
        .find_map(|(e, _)| e.wall_clock)
}

fn within(secs: Option<i64>, window: (i64, i64)) -> Option<i64> {
    secs.filter(|s| *s >= window.0 && *s <= window.1)
}

/// Length from each flagged row to the next unflagged row that has a time,
/// keeping the spans inside `window`.
fn flagged_spans(events: &[PlayEvent], mask: &[bool], window: (i64, i64)) -> Vec<f64> {
    let mut spans = Vec::new();
    for (i, event) in events.iter().enumerate() {
        if !mask[i] {
            continue;
        }
        let next = events[i + 1..]
            .iter()
            .zip(&mask[i + 1..])
            .find(|(e, m)| !**m && e.wall_clock.is_some())
            .and_then(|(e, _)| e.wall_clock);
        if let Some(secs) = within(signed_delta_secs(event.wall_clock, next), window) {
            spans.push(secs as f64);
        }
    }
    spans
}

fn marker_metrics(game: &Game) -> GameMetrics {
    let plays = game.sorted_by(|e| (e.period.unwrap_or(0), e.eventnum.is_none(), e.eventnum));
    let first_valid = plays.iter().find_map(|e| e.wall_clock);
    let last_valid = plays.iter().rev().find_map(|e| e.wall_clock);

    let start = first_flagged_time(&plays, &flags(&plays, events::GAME_START)).or(first_valid);
    let game_end = flags(&plays, events::GAME_END);
    let end = last_flagged_time(&plays, &game_end).or(last_valid);
    let game_duration_min = signed_delta_secs(start, end)
        .filter(|s| *s >= 0)
        .map(|s| s as f64 / 60.0);

    let timeout_mask = flags(&plays, events::TIMEOUT);
    let replay_mask = flags(&plays, events::REPLAY);

    let end_first_half = flags(&plays, events::END_FIRST_HALF);
    let start_second_half = flags(&plays, events::START_SECOND_HALF);
    let halftime_secs = if end_first_half.contains(&true) {
        signed_delta_secs(
            last_flagged_time(&plays, &end_first_half),
            first_flagged_time(&plays, &start_second_half),
        )
    } else {
        let end_second = flags(&plays, events::END_SECOND_PERIOD);
        let start_third = flags(&plays, events::START_THIRD_PERIOD);
        if end_second.contains(&true) && start_third.contains(&true) {
            signed_delta_secs(
                last_flagged_time(&plays, &end_second),
                first_flagged_time(&plays, &start_third),
            )
        } else {
            None
        }
    };

    let start_fourth = flags(&plays, events::START_FOURTH);
    let end_fourth = flags(&plays, events::END_FOURTH);
    let fourth_secs = if start_fourth.contains(&true) && end_fourth.contains(&true) {
        signed_delta_secs(
            first_flagged_time(&plays, &start_fourth),
            last_flagged_time(&plays, &end_fourth),
        )
    } else if start_second_half.contains(&true) && game_end.contains(&true) {
        // Halves era: the second half stands in for the fourth quarter.
        signed_delta_secs(
            first_flagged_time(&plays, &start_second_half),
            last_flagged_time(&plays, &game_end),
        )
    } else {
        None
    };

    GameMetrics {
        game_id: game.game_id.clone(),
        season: game.season(),
        game_duration_min,
        challenges: count(&flags(&plays, events::CHALLENGE)),
        timeouts: count(&timeout_mask),
        avg_timeout_len_sec: mean(&flagged_spans(&plays, &timeout_mask, TIMEOUT_WINDOW)),
        replays: count(&replay_mask),
        avg_replay_len_sec: mean(&flagged_spans(&plays, &replay_mask, REPLAY_WINDOW)),
        halftime_len_min: within(halftime_secs, HALFTIME_WINDOW).map(|s| s as f64 / 60.0),
        free_throws: count(&flags(&plays, events::FREE_THROW)),
        q4_len_min: within(fourth_secs, FOURTH_WINDOW).map(|s| s as f64 / 60.0),
        fouls: count(&flags(&plays, events::FOUL)),
    }
}

/// Sum of positive gaps from each flagged row to the next unflagged row,
/// spread over the flagged count.
fn average_segment(wall: &[Option<i64>], mask: &[bool]) -> Option<f64> {
    let flagged = count(mask);
    if flagged == 0 {
        return None;
    }
    let mut total = 0.0;
    for i in 0..wall.len() {
        if !mask[i] {
            continue;
        }
        let next = (i + 1..wall.len()).find(|j| !mask[*j]);
        if let Some(j) = next {
            if let (Some(from), Some(to)) = (wall[i], wall[j]) {
                if to > from {
                    total += (to - from) as f64;
                }
            }
        }
    }
    Some(total / flagged as f64)
}

fn boundary_metrics(game: &Game) -> GameMetrics {
    let plays = game.sorted_by(|e| (e.eventnum.is_none(), e.eventnum));
    let clocks: Vec<Option<WallClock>> = plays.iter().map(|e| e.wall_clock).collect();
    let wall = monotonic_seconds(&clocks);

    // Text markers first, then the period start/end event codes.
    let boundary = |period: u32, kind: Boundary| -> Option<i64> {
        let text = events::period_boundary_text(period, kind);
        let code = match kind {
            Boundary::Start => EventType::PeriodStart,
            Boundary::End => EventType::PeriodEnd,
        };
        plays
            .iter()
            .position(|e| e.descriptions.neutral_mentions(&text))
            .or_else(|| {
                plays
                    .iter()
                    .position(|e| e.is(code) && e.period == Some(period as i64))
            })
            .and_then(|i| wall[i])
    };
    let first_valid = wall.iter().find_map(|w| *w);
    let last_valid = wall.iter().rev().find_map(|w| *w);

    let start = boundary(1, Boundary::Start).or(first_valid);
    let end = boundary(4, Boundary::End)
        .or_else(|| {
            plays
                .iter()
                .rposition(|e| e.descriptions.neutral_mentions(events::END_OF_GAME))
                .and_then(|i| wall[i])
        })
        .or(last_valid);
    let game_duration_min = match (start, end) {
        (Some(s), Some(e)) if e >= s => Some((e - s) as f64 / 60.0),
        _ => None,
    };

    let timeout_mask = flags(&plays, events::TIMEOUT);
    let replay_mask = flags(&plays, events::INSTANT_REPLAY);

    let halftime_len_min = (1..=3)
        .filter_map(|p| match (boundary(p, Boundary::End), boundary(p + 1, Boundary::Start)) {
            (Some(e), Some(s)) if s > e => Some(s - e),
            _ => None,
        })
        .max()
        .map(|gap| gap as f64 / 60.0);

    let q4_len_min = match (boundary(4, Boundary::Start), boundary(4, Boundary::End)) {
        (Some(s), Some(e)) if e > s => Some((e - s) as f64 / 60.0),
        _ => None,
    };

    let (free_throws, fouls) = if game.has_event_types() {
        (
            plays.iter().filter(|e| e.is(EventType::FreeThrow)).count() as u32,
            plays.iter().filter(|e| e.is(EventType::Foul)).count() as u32,
        )
    } else {
        (
            count(&flags(&plays, events::FREE_THROW)),
            count(&flags(&plays, events::FOUL)),
        )
    };

    GameMetrics {
        game_id: game.game_id.clone(),
        season: game.season(),
        game_duration_min,
        challenges: count(&flags(&plays, events::CHALLENGE)),
        timeouts: count(&timeout_mask),
        avg_timeout_len_sec: average_segment(&wall, &timeout_mask),
        replays: count(&replay_mask),
        avg_replay_len_sec: average_segment(&wall, &replay_mask),
        halftime_len_min,
        free_throws,
        q4_len_min,
        fouls,
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsOptions {
    pub heuristic: Heuristic,
    pub duration_bounds: Option<DurationBounds>,
    /// Log progress every this many games; 0 disables it.
    pub progress_every: usize,
}

pub fn compute_all(games: &[Game], options: &MetricsOptions) -> Vec<GameMetrics> {
    let total = games.len();
    info!("computing {} metrics for {} games", options.heuristic, total);
    let mut rows = Vec::with_capacity(total);
    for (i, game) in games.iter().enumerate() {
        rows.push(game_metrics(game, options.heuristic));
        let done = i + 1;
        if options.progress_every > 0 && (done % options.progress_every == 0 || done == total) {
            info!("processed {}/{} games", done, total);
        }
    }
    if let Some(bounds) = options.duration_bounds {
        let before = rows.len();
        rows.retain(|m| bounds.contains(m.game_duration_min));
        info!(
            "duration filter [{}] kept {} / {} games",
            bounds,
            rows.len(),
            before
        );
    }
    let missing = rows.iter().filter(|m| m.season.is_none()).count();
    if missing > 0 {
        warn!("{} games have no season and are left out of the season table", missing);
    }
    rows
}

pub fn per_game_frame(rows: &[GameMetrics]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(GAME_ID.into(), rows.iter().map(|m| m.game_id.clone()).collect::<Vec<String>>()),
        Column::new("season".into(), rows.iter().map(|m| m.season).collect::<Vec<Option<i32>>>()),
        Column::new("game_duration_min".into(), rows.iter().map(|m| m.game_duration_min).collect::<Vec<_>>()),
        Column::new("challenges".into(), rows.iter().map(|m| m.challenges).collect::<Vec<u32>>()),
        Column::new("timeouts".into(), rows.iter().map(|m| m.timeouts).collect::<Vec<u32>>()),
        Column::new("avg_timeout_len_sec".into(), rows.iter().map(|m| m.avg_timeout_len_sec).collect::<Vec<_>>()),
        Column::new("replays".into(), rows.iter().map(|m| m.replays).collect::<Vec<u32>>()),
        Column::new("avg_replay_len_sec".into(), rows.iter().map(|m| m.avg_replay_len_sec).collect::<Vec<_>>()),
        Column::new("halftime_len_min".into(), rows.iter().map(|m| m.halftime_len_min).collect::<Vec<_>>()),
        Column::new("free_throws".into(), rows.iter().map(|m| m.free_throws).collect::<Vec<u32>>()),
        Column::new("q4_len_min".into(), rows.iter().map(|m| m.q4_len_min).collect::<Vec<_>>()),
        Column::new("fouls".into(), rows.iter().map(|m| m.fouls).collect::<Vec<u32>>()),
    ])?;
    Ok(df)
}

/// Season means of every per-game metric, ignoring missing values.
pub fn season_table(per_game: &DataFrame) -> Result<DataFrame> {
    let aggregations: Vec<Expr> = SEASON_COLUMNS
        .iter()
        .map(|(source, header)| col(*source).cast(DataType::Float64).mean().alias(*header))
        .collect();
    let table = per_game
        .clone()
        .lazy()
        .filter(col("season").is_not_null())
        .group_by([col("season").alias("Season")])
        .agg(aggregations)
        .sort(["Season"], Default::default())
        .collect()?;
    Ok(table)
}

/// Per-game and season tables for a play-by-play frame.
pub fn season_metrics(pbp: &DataFrame, options: &MetricsOptions) -> Result<(DataFrame, DataFrame)> {
    let games = frame::games(pbp)?;
    let rows = compute_all(&games, options);
    let per_game = per_game_frame(&rows)?;
    let seasons = season_table(&per_game)?;
    info!("built season table with {} seasons", seasons.height());
    Ok((per_game, seasons))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbp::events::Descriptions;

    fn event(eventnum: i64, period: i64, wc: Option<&str>, neutral: Option<&str>, home: Option<&str>) -> PlayEvent {
        PlayEvent {
            game_id: "1022300001".to_string(),
            eventnum: Some(eventnum),
            period: Some(period),
            wctimestring: wc.map(str::to_string),
            wall_clock: wc.and_then(WallClock::parse),
            descriptions: Descriptions::new(home, neutral, None),
            season: Some(2023),
            ..Default::default()
        }
    }

    fn quarters_game() -> Game {
        let mut game = Game::new("1022300001");
        game.events = vec![
            event(1, 1, Some("7:00 PM"), Some("Start of 1st Period (7:00 PM EST)"), None),
            event(2, 1, Some("7:10 PM"), None, Some("Aces Timeout: Regular")),
            event(3, 1, Some("7:12 PM"), None, Some("Wilson S.FOUL (P1.T1)")),
            event(4, 1, Some("7:12 PM"), None, Some("Wilson Free Throw 1 of 2")),
            event(5, 1, Some("7:30 PM"), Some("End of 1st Period"), None),
            event(6, 2, Some("7:32 PM"), Some("Start of 2nd Period"), None),
            event(7, 2, Some("7:50 PM"), None, Some("Instant Replay - Challenge: Overturned")),
            event(8, 2, Some("7:51 PM"), None, Some("Jump Shot")),
            event(9, 2, Some("8:00 PM"), Some("End of 2nd Period"), None),
            event(10, 3, Some("8:15 PM"), Some("Start of 3rd Period"), None),
            event(11, 3, Some("8:40 PM"), Some("End of 3rd Period"), None),
            event(12, 4, Some("8:42 PM"), Some("Start of 4th Period"), None),
            event(13, 4, Some("9:10 PM"), Some("End of 4th Period"), None),
        ];
        game
    }

    #[test]
    fn boundary_heuristic_on_quarters() {
        let m = game_metrics(&quarters_game(), Heuristic::Boundaries);
        assert_eq!(m.season, Some(2023));
        assert_eq!(m.game_duration_min, Some(130.0));
        assert_eq!(m.timeouts, 1);
        assert_eq!(m.avg_timeout_len_sec, Some(120.0));
        assert_eq!(m.challenges, 1);
        assert_eq!(m.replays, 1);
        assert_eq!(m.avg_replay_len_sec, Some(60.0));
        assert_eq!(m.halftime_len_min, Some(15.0));
        assert_eq!(m.q4_len_min, Some(28.0));
        assert_eq!(m.free_throws, 1);
        assert_eq!(m.fouls, 1);
    }

    #[test]
    fn marker_heuristic_on_quarters() {
        let m = game_metrics(&quarters_game(), Heuristic::Markers);
        assert_eq!(m.game_duration_min, Some(130.0));
        assert_eq!(m.avg_timeout_len_sec, Some(120.0));
        assert_eq!(m.avg_replay_len_sec, Some(60.0));
        assert_eq!(m.halftime_len_min, Some(15.0));
        assert_eq!(m.q4_len_min, Some(28.0));
    }

    #[test]
    fn boundary_heuristic_prefers_event_codes() {
        let mut game = quarters_game();
        game.events[2].event_type = Some(6);
        game.events[3].event_type = Some(1);
        let m = game_metrics(&game, Heuristic::Boundaries);
        assert_eq!(m.fouls, 1);
        assert_eq!(m.free_throws, 0);
    }

    #[test]
    fn boundary_heuristic_falls_back_to_period_codes() {
        let mut game = quarters_game();
        for e in game.events.iter_mut() {
            if let Some(text) = e.descriptions.neutral.clone() {
                e.event_type = Some(if text.starts_with("start") { 12 } else { 13 });
                e.descriptions.neutral = None;
            }
        }
        let m = game_metrics(&game, Heuristic::Boundaries);
        assert_eq!(m.game_duration_min, Some(130.0));
        assert_eq!(m.halftime_len_min, Some(15.0));
        assert_eq!(m.q4_len_min, Some(28.0));
    }

    fn halves_game() -> Game {
        let mut game = Game::new("1020800001");
        game.events = vec![
            event(1, 1, Some("7:00 PM"), Some("Start of 1st Half"), None),
            event(2, 1, Some("7:20 PM"), None, Some("Layup")),
            event(3, 1, Some("7:45 PM"), Some("End of 1st Half"), None),
            event(4, 2, Some("8:00 PM"), Some("Start of 2nd Half"), None),
            event(5, 2, Some("8:30 PM"), None, Some("Jump Shot")),
            event(6, 2, Some("8:50 PM"), Some("End of Game"), None),
        ];
        game
    }

    #[test]
    fn marker_heuristic_on_halves() {
        let m = game_metrics(&halves_game(), Heuristic::Markers);
        assert_eq!(m.game_duration_min, Some(110.0));
        assert_eq!(m.halftime_len_min, Some(15.0));
        // No quarters: the second half stands in for the fourth.
        assert_eq!(m.q4_len_min, Some(50.0));
    }

    #[test]
    fn halves_without_second_half_start() {
        let mut game = halves_game();
        game.events.remove(3);
        let m = game_metrics(&game, Heuristic::Markers);
        assert_eq!(m.halftime_len_min, None);
        assert_eq!(m.q4_len_min, None);
        assert_eq!(m.game_duration_min, Some(110.0));
    }

    #[test]
    fn halftime_outside_window_is_dropped() {
        let mut short = halves_game();
        short.events[3] = event(4, 2, Some("7:46 PM"), Some("Start of 2nd Half"), None);
        assert_eq!(game_metrics(&short, Heuristic::Markers).halftime_len_min, None);

        let mut long = halves_game();
        long.events[3] = event(4, 2, Some("8:25 PM"), Some("Start of 2nd Half"), None);
        assert_eq!(game_metrics(&long, Heuristic::Markers).halftime_len_min, None);
    }

    #[test]
    fn durations_cross_midnight() {
        let mut game = Game::new("1022300002");
        game.events = vec![
            event(1, 1, Some("10:30 PM"), Some("Start of 1st Period"), None),
            event(2, 2, None, None, Some("Layup")),
            event(3, 4, Some("12:40 AM"), Some("End of 4th Period"), None),
        ];
        for heuristic in [Heuristic::Markers, Heuristic::Boundaries] {
            let m = game_metrics(&game, heuristic);
            assert_eq!(m.game_duration_min, Some(130.0), "{}", heuristic);
        }
    }

    #[test]
    fn marker_windows_drop_implausible_spans() {
        let mut game = Game::new("1022300003");
        game.events = vec![
            event(1, 1, Some("7:00 PM"), None, Some("Timeout: Regular")),
            event(2, 1, Some("7:20 PM"), None, Some("Layup")),
        ];
        let m = game_metrics(&game, Heuristic::Markers);
        assert_eq!(m.timeouts, 1);
        assert_eq!(m.avg_timeout_len_sec, None);
        assert_eq!(m.halftime_len_min, None);
    }

    #[test]
    fn game_without_times_has_no_duration() {
        let mut game = Game::new("1022300004");
        game.events = vec![event(1, 1, None, None, Some("Layup")), event(2, 1, Some("junk"), None, None)];
        assert_eq!(game_metrics(&game, Heuristic::Boundaries).game_duration_min, None);
        assert_eq!(game_metrics(&game, Heuristic::Markers).game_duration_min, None);
    }

    #[test]
    fn bounds_parse_and_filter() {
        let bounds: DurationBounds = "90, 180".parse().unwrap();
        assert_eq!(bounds, DurationBounds::default());
        assert!(bounds.contains(Some(90.0)));
        assert!(!bounds.contains(Some(180.5)));
        assert!(!bounds.contains(None));
        assert!("90".parse::<DurationBounds>().is_err());
        assert!("180,90".parse::<DurationBounds>().is_err());
    }

    #[test]
    fn season_table_averages_ignore_missing() {
        let rows = vec![
            GameMetrics {
                game_id: "a".into(),
                season: Some(2023),
                game_duration_min: Some(120.0),
                timeouts: 4,
                ..Default::default()
            },
            GameMetrics {
                game_id: "b".into(),
                season: Some(2023),
                game_duration_min: None,
                timeouts: 6,
                ..Default::default()
            },
            GameMetrics {
                game_id: "c".into(),
                season: Some(2019),
                game_duration_min: Some(100.0),
                ..Default::default()
            },
            GameMetrics {
                game_id: "d".into(),
                season: None,
                game_duration_min: Some(500.0),
                ..Default::default()
            },
        ];
        let table = season_table(&per_game_frame(&rows).unwrap()).unwrap();
        assert_eq!(table.height(), 2);
        let seasons: Vec<Option<i32>> = table.column("Season").unwrap().as_materialized_series().i32().unwrap().into_iter().collect();
        assert_eq!(seasons, vec![Some(2019), Some(2023)]);
        let durations: Vec<Option<f64>> = table
            .column("Average Game Duration (min)")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(durations, vec![Some(100.0), Some(120.0)]);
        let timeouts = table
            .column("Average Timeouts Per Game")
            .unwrap()
            .as_materialized_series()
            .f64().unwrap().get(1);
        assert_eq!(timeouts, Some(5.0));
    }
}
