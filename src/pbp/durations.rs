//! Game lengths from the period boundary rows, and their season averages.
//!
//! A game runs from its first "Start of 1st Period" row to its last "End of
//! 4th Period" row. Overtime is not counted.

use log::{info, warn};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

use super::error::{PbpError, Result};
use super::events::{period_boundary_text, Boundary};
use super::frame::{self, Game, GAME_ID};
use super::metrics::DurationBounds;
use super::season;
use super::wallclock::{forward_delta_secs, WallClock};

const PRE_AGGREGATED: (&str, &str) = ("Season", "Average Game Duration (min)");
const DURATION_COLUMNS: &[&str] = &["duration_min", "game_duration_minutes"];
const PBP_SEASON: &str = "_year";

#[derive(Debug, Clone, PartialEq)]
pub struct GameBoundaries {
    pub game_id: String,
    pub start_time: String,
    pub end_time: String,
    pub season: Option<i32>,
    pub source_file: String,
    pub game_duration_minutes: Option<f64>,
}

fn boundary_time(game: &Game, boundary: Boundary) -> Option<String> {
    let text = match boundary {
        Boundary::Start => period_boundary_text(1, Boundary::Start),
        Boundary::End => period_boundary_text(4, Boundary::End),
    };
    let mut rows = game.events.iter().filter(|e| e.descriptions.neutral_mentions(&text));
    let row = match boundary {
        Boundary::Start => rows.next(),
        Boundary::End => rows.last(),
    }?;
    Some(row.wctimestring.clone().unwrap_or_default())
}

/// Start and end rows of every game that has both. `source` labels the
/// file the games came from and is the season of last resort.
pub fn game_boundaries(games: &[Game], source: &str) -> Vec<GameBoundaries> {
    let mut rows = Vec::new();
    for game in games {
        let (start_time, end_time) = match (
            boundary_time(game, Boundary::Start),
            boundary_time(game, Boundary::End),
        ) {
            (Some(s), Some(e)) => (s, e),
            _ => continue,
        };
        let game_duration_minutes = match (WallClock::parse(&start_time), WallClock::parse(&end_time)) {
            (Some(a), Some(b)) => Some(forward_delta_secs(a, b) as f64 / 60.0),
            _ => None,
        };
        rows.push(GameBoundaries {
            game_id: game.game_id.clone(),
            season: game.season().or_else(|| season::from_file_name(source)),
            source_file: source.to_string(),
            start_time,
            end_time,
            game_duration_minutes,
        });
    }
    let skipped = games.len() - rows.len();
    if skipped > 0 {
        warn!("{}: {} games lack a start or end of regulation row", source, skipped);
    }
    rows
}

/// Games inside `bounds`, first row per game id.
pub fn clean_durations(rows: &[GameBoundaries], bounds: &DurationBounds) -> Vec<GameBoundaries> {
    let mut seen = HashSet::new();
    let cleaned: Vec<GameBoundaries> = rows
        .iter()
        .filter(|r| bounds.contains(r.game_duration_minutes))
        .filter(|r| seen.insert(r.game_id.clone()))
        .cloned()
        .collect();
    info!("kept {} unique games of {} within [{}]", cleaned.len(), rows.len(), bounds);
    cleaned
}

pub fn boundaries_frame(rows: &[GameBoundaries]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(GAME_ID.into(), rows.iter().map(|r| r.game_id.clone()).collect::<Vec<String>>()),
        Column::new("start_time".into(), rows.iter().map(|r| r.start_time.clone()).collect::<Vec<String>>()),
        Column::new("end_time".into(), rows.iter().map(|r| r.end_time.clone()).collect::<Vec<String>>()),
        Column::new("season".into(), rows.iter().map(|r| r.season).collect::<Vec<Option<i32>>>()),
        Column::new("source_file".into(), rows.iter().map(|r| r.source_file.clone()).collect::<Vec<String>>()),
        Column::new(
            "game_duration_minutes".into(),
            rows.iter().map(|r| r.game_duration_minutes).collect::<Vec<Option<f64>>>(),
        ),
    ])?;
    Ok(df)
}

/// Mean duration per season, ascending.
fn average_by_season(pairs: Vec<(i32, f64)>) -> Result<DataFrame> {
    let (seasons, minutes): (Vec<i32>, Vec<f64>) = pairs.into_iter().unzip();
    let df = DataFrame::new(vec![
        Column::new("Season".into(), seasons),
        Column::new("avg_min".into(), minutes),
    ])?;
    let averages = df
        .lazy()
        .group_by([col("Season")])
        .agg([col("avg_min").mean()])
        .sort(["Season"], Default::default())
        .collect()?;
    Ok(averages)
}

fn parsed_pairs(seasons: Vec<Option<i32>>, minutes: Vec<Option<String>>) -> Vec<(i32, f64)> {
    seasons
        .into_iter()
        .zip(minutes)
        .filter_map(|(s, m)| Some((s?, frame::parse_float(m.as_deref()?)?)))
        .collect()
}

/// `GAME_ID -> season` from a play-by-play frame, first row per game.
fn pbp_seasons(pbp: &DataFrame) -> Result<HashMap<String, i32>> {
    let game_col = frame::require_column(pbp, GAME_ID)?;
    let year_col = frame::require_column(pbp, PBP_SEASON)?;
    let mut lookup = HashMap::new();
    for (id, year) in frame::string_values(pbp, &game_col)?
        .into_iter()
        .zip(frame::string_values(pbp, &year_col)?)
    {
        if let (Some(id), Some(year)) = (id, year.as_deref().and_then(season::from_label)) {
            lookup.entry(frame::normalize_game_id(&id)).or_insert(year);
        }
    }
    Ok(lookup)
}

/// Season averages from whichever duration table layout `df` has: a season
/// aggregate, per-game rows with a season, or per-game rows keyed by
/// `GAME_ID` whose season comes from `pbp` or the id itself.
pub fn season_averages(df: &DataFrame, pbp: Option<&DataFrame>) -> Result<DataFrame> {
    let (season_header, duration_header) = PRE_AGGREGATED;
    if let (Some(s), Some(d)) = (
        frame::resolve_column(df, &[season_header]),
        frame::resolve_column(df, &[duration_header]),
    ) {
        info!("input is already aggregated by season");
        let seasons = frame::string_values(df, &s)?
            .iter()
            .map(|v| v.as_deref().and_then(season::from_label))
            .collect();
        return average_by_season(parsed_pairs(seasons, frame::string_values(df, &d)?));
    }

    let duration_col = frame::resolve_column(df, DURATION_COLUMNS)
        .ok_or_else(|| PbpError::UnknownLayout(frame::column_names(df)))?;
    let minutes = frame::string_values(df, &duration_col)?;

    if let Some(s) = frame::resolve_column(df, &["season"]) {
        info!("averaging per-game durations by their season column");
        let seasons = frame::string_values(df, &s)?
            .iter()
            .map(|v| v.as_deref().and_then(season::from_label))
            .collect();
        return average_by_season(parsed_pairs(seasons, minutes));
    }

    let game_col = frame::resolve_column(df, &[GAME_ID])
        .ok_or_else(|| PbpError::UnknownLayout(frame::column_names(df)))?;
    let lookup = match pbp {
        Some(pbp) => pbp_seasons(pbp)?,
        None => HashMap::new(),
    };
    let seasons: Vec<Option<i32>> = frame::string_values(df, &game_col)?
        .iter()
        .map(|id| {
            let id = frame::normalize_game_id(id.as_deref()?);
            lookup.get(&id).copied().or_else(|| season::from_game_id(&id))
        })
        .collect();
    let missing = seasons.iter().filter(|s| s.is_none()).count();
    if missing > 0 {
        warn!("no season for {} games, dropping them", missing);
    }
    average_by_season(parsed_pairs(seasons, minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pbp() -> DataFrame {
        df!(
            "GAME_ID" => &["1021400001", "1021400001", "1021400001", "1021400001", "1021400002", "1021400003", "1021400003"],
            "NEUTRALDESCRIPTION" => &[
                Some("Start of 1st Period (7:00 PM EST)"), None, Some("End of 4th Period"), Some("End of 4th Period"),
                Some("Start of 1st Period"), Some("Start of 1st Period"), Some("End of 4th Period"),
            ],
            "WCTIMESTRING" => &["7:00 PM", "7:30 PM", "8:50 PM", "9:05 PM", "1:00 PM", "11:30 PM", "1:20 AM"]
        )
        .unwrap()
    }

    #[test]
    fn pairs_first_start_with_last_end() {
        let games = frame::games(&pbp()).unwrap();
        let rows = game_boundaries(&games, "wnba_2014_Aces_pbp.csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].start_time, "7:00 PM");
        assert_eq!(rows[0].end_time, "9:05 PM");
        assert_eq!(rows[0].game_duration_minutes, Some(125.0));
        assert_eq!(rows[0].season, Some(2014));
        assert_eq!(rows[1].game_duration_minutes, Some(110.0));
        assert_eq!(boundaries_frame(&rows).unwrap().height(), 2);
    }

    #[test]
    fn cleaning_applies_bounds_and_dedupes() {
        let games = frame::games(&pbp()).unwrap();
        let mut rows = game_boundaries(&games, "a.csv");
        rows.extend(game_boundaries(&games, "b.csv"));
        let cleaned = clean_durations(&rows, &DurationBounds::new(115.0, 180.0));
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].source_file, "a.csv");
    }

    fn avg(df: &DataFrame) -> Vec<(i32, f64)> {
        let seasons = df.column("Season").unwrap().as_materialized_series().i32().unwrap().clone();
        let mins = df.column("avg_min").unwrap().as_materialized_series().f64().unwrap().clone();
        seasons.into_iter().zip(&mins).map(|(s, m)| (s.unwrap(), m.unwrap())).collect()
    }

    #[test]
    fn averages_pre_aggregated_table() {
        let df = df!(
            "Season" => &["2015", "2014", ""],
            "Average Game Duration (min)" => &["120.5", "118", "130"]
        )
        .unwrap();
        assert_eq!(avg(&season_averages(&df, None).unwrap()), vec![(2014, 118.0), (2015, 120.5)]);
    }

    #[test]
    fn averages_per_game_rows_with_season() {
        let df = df!(
            "season" => &["2014", "2014", "2015"],
            "game_duration_minutes" => &["120", "130", "nan"]
        )
        .unwrap();
        assert_eq!(avg(&season_averages(&df, None).unwrap()), vec![(2014, 125.0)]);
    }

    #[test]
    fn averages_per_game_rows_keyed_by_game() {
        let df = df!(
            "GAME_ID" => &["1021400001", "99", "1022300001"],
            "duration_min" => &["120", "100", "140"]
        )
        .unwrap();
        let lookup = df!("GAME_ID" => &["99", "99"], "_year" => &["2010", "2011"]).unwrap();
        assert_eq!(
            avg(&season_averages(&df, Some(&lookup)).unwrap()),
            vec![(2010, 100.0), (2014, 120.0), (2023, 140.0)]
        );
    }

    #[test]
    fn unknown_layout_lists_columns() {
        let df = df!("foo" => &["1"]).unwrap();
        match season_averages(&df, None) {
            Err(PbpError::UnknownLayout(cols)) => assert_eq!(cols, vec!["foo".to_string()]),
            other => panic!("expected unknown layout, got {:?}", other.map(|d| d.height())),
        }
    }
}
