//! Event density checks: long silences between events and bursts of many
//! events logged in the same minute or two.
//!
//! Events are expected in time order, one game at a time.

use log::{info, warn};
use polars::prelude::*;

use super::error::Result;
use super::frame::{self, Game, PlayEvent, GAME_ID};
use super::wallclock::{forward_delta_secs, WallClock};

#[derive(Debug, Clone, PartialEq)]
pub struct LongGap {
    pub game_id: String,
    pub eventnum: Option<i64>,
    pub start_time: String,
    pub end_time: String,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventBurst {
    pub game_id: String,
    pub eventnum_start: Option<i64>,
    pub eventnum_end: Option<i64>,
    pub event_count: usize,
    pub start_time: String,
    pub end_time: String,
}

/// Events of one game that carry a parsable wall clock.
fn timed(events: &[PlayEvent]) -> Vec<(&PlayEvent, WallClock)> {
    let timed: Vec<(&PlayEvent, WallClock)> = events
        .iter()
        .filter_map(|e| e.wall_clock.map(|wc| (e, wc)))
        .collect();
    let skipped = events.len() - timed.len();
    if skipped > 0 {
        let game = events.first().map(|e| e.game_id.as_str()).unwrap_or_default();
        warn!("game {}: skipped {} rows without a parsable time", game, skipped);
    }
    timed
}

fn time_text(event: &PlayEvent, wc: WallClock) -> String {
    event.wctimestring.clone().unwrap_or_else(|| wc.to_string())
}

/// Pairs `step` events apart whose forward gap is strictly longer than
/// `minutes_threshold`.
pub fn find_long_gaps(events: &[PlayEvent], minutes_threshold: i64, step: usize) -> Vec<LongGap> {
    let timed = timed(events);
    if step == 0 || step >= timed.len() {
        return Vec::new();
    }
    timed
        .iter()
        .zip(timed[step..].iter())
        .filter_map(|((start, a), (end, b))| {
            let secs = forward_delta_secs(*a, *b);
            if secs > minutes_threshold * 60 {
                Some(LongGap {
                    game_id: start.game_id.clone(),
                    eventnum: start.eventnum,
                    start_time: time_text(start, *a),
                    end_time: time_text(end, *b),
                    minutes: secs as f64 / 60.0,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Every run of `window` consecutive events spanning at most
/// `minutes_threshold` minutes.
pub fn find_event_bursts(events: &[PlayEvent], minutes_threshold: i64, window: usize) -> Vec<EventBurst> {
    let timed = timed(events);
    if window == 0 || window > timed.len() {
        return Vec::new();
    }
    timed
        .windows(window)
        .filter_map(|w| {
            let (start, a) = w[0];
            let (end, b) = w[window - 1];
            if forward_delta_secs(a, b) <= minutes_threshold * 60 {
                Some(EventBurst {
                    game_id: start.game_id.clone(),
                    eventnum_start: start.eventnum,
                    eventnum_end: end.eventnum,
                    event_count: window,
                    start_time: time_text(start, a),
                    end_time: time_text(end, b),
                })
            } else {
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct DensityOptions {
    pub gap_minutes: i64,
    pub gap_step: usize,
    pub burst_minutes: i64,
    pub burst_window: usize,
}

impl Default for DensityOptions {
    fn default() -> Self {
        DensityOptions {
            gap_minutes: 20,
            gap_step: 1,
            burst_minutes: 0,
            burst_window: 10,
        }
    }
}

pub fn long_gap_frame(rows: &[LongGap]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(GAME_ID.into(), rows.iter().map(|g| g.game_id.clone()).collect::<Vec<String>>()),
        Column::new("EVENTNUM".into(), rows.iter().map(|g| g.eventnum).collect::<Vec<Option<i64>>>()),
        Column::new("START_TIME".into(), rows.iter().map(|g| g.start_time.clone()).collect::<Vec<String>>()),
        Column::new("END_TIME".into(), rows.iter().map(|g| g.end_time.clone()).collect::<Vec<String>>()),
        Column::new("MIN_DIFF".into(), rows.iter().map(|g| g.minutes).collect::<Vec<f64>>()),
    ])?;
    Ok(df)
}

pub fn burst_frame(rows: &[EventBurst]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(GAME_ID.into(), rows.iter().map(|b| b.game_id.clone()).collect::<Vec<String>>()),
        Column::new("EVENTNUM_START".into(), rows.iter().map(|b| b.eventnum_start).collect::<Vec<Option<i64>>>()),
        Column::new("EVENTNUM_END".into(), rows.iter().map(|b| b.eventnum_end).collect::<Vec<Option<i64>>>()),
        Column::new("EVENT_COUNT".into(), rows.iter().map(|b| b.event_count as u32).collect::<Vec<u32>>()),
        Column::new("START_TIME".into(), rows.iter().map(|b| b.start_time.clone()).collect::<Vec<String>>()),
        Column::new("END_TIME".into(), rows.iter().map(|b| b.end_time.clone()).collect::<Vec<String>>()),
    ])?;
    Ok(df)
}

/// Long gaps and bursts over every game of a play-by-play frame, in file
/// order within each game.
pub fn densities(pbp: &DataFrame, options: &DensityOptions) -> Result<(DataFrame, DataFrame)> {
    let games: Vec<Game> = frame::games(pbp)?;
    let mut gaps = Vec::new();
    let mut bursts = Vec::new();
    for game in &games {
        gaps.extend(find_long_gaps(&game.events, options.gap_minutes, options.gap_step));
        bursts.extend(find_event_bursts(&game.events, options.burst_minutes, options.burst_window));
    }
    info!(
        "found {} long gaps and {} bursts across {} games",
        gaps.len(),
        bursts.len(),
        games.len()
    );
    Ok((long_gap_frame(&gaps)?, burst_frame(&bursts)?))
}
