use std::fs;
use std::path::{Path, PathBuf};

use pbp_tools::pbp::density::{self, DensityOptions};
use pbp_tools::pbp::metrics::{self, DurationBounds, Heuristic, MetricsOptions};
use pbp_tools::pbp::{anomalies, durations, frame, summary, PbpError};
use polars::prelude::*;

const HEADER: &str = "GAME_ID,EVENTNUM,EVENTMSGTYPE,PERIOD,WCTIMESTRING,PCTIMESTRING,HOMEDESCRIPTION,NEUTRALDESCRIPTION,VISITORDESCRIPTION,SCORE,PLAYER1_TEAM_ABBREVIATION";

// A full four period game and a short one whose score goes backwards.
const ROWS: &[&str] = &[
    "1022300001,1,12,1,7:00 PM,10:00,,Start of 1st Period (7:00 PM EST),,,",
    "1022300001,2,1,1,7:05 PM,9:30,Wilson Layup,,,2 - 0,LVA",
    "1022300001,3,9,1,7:20 PM,5:00,Aces Timeout: Regular,,,,LVA",
    "1022300001,4,6,1,7:22 PM,4:50,,,Stewart S.FOUL (P1.T1),,SEA",
    "1022300001,5,3,1,7:23 PM,4:50,Wilson Free Throw 1 of 2,,,3 - 0,LVA",
    "1022300001,6,13,1,7:35 PM,0:00,,End of 1st Period (7:35 PM EST),,,",
    "1022300001,7,12,2,7:37 PM,10:00,,Start of 2nd Period (7:37 PM EST),,,",
    "1022300001,8,13,2,8:00 PM,0:00,,End of 2nd Period (8:00 PM EST),,,",
    "1022300001,9,12,3,8:15 PM,10:00,,Start of 3rd Period (8:15 PM EST),,,",
    "1022300001,10,13,3,8:40 PM,0:00,,End of 3rd Period (8:40 PM EST),,,",
    "1022300001,11,12,4,8:42 PM,10:00,,Start of 4th Period (8:42 PM EST),,,",
    "1022300001,12,13,4,9:10 PM,0:00,,End of 4th Period (9:10 PM EST),,,",
    "1022300002,1,12,1,7:00 PM,10:00,,Start of 1st Period,,,",
    "1022300002,2,1,1,7:10 PM,8:00,Hamby Jump Shot,,,4 - 2,LVA",
    "1022300002,3,1,1,7:15 PM,7:00,,,Loyd Layup,3 - 2,SEA",
    "1022300002,4,13,4,8:00 PM,0:00,,End of 4th Period,,,",
];

fn write_fixture(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::from(HEADER);
    for row in ROWS {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    fs::write(&path, body).unwrap();
    path
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn reads_every_column_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let df = frame::read_csv(&write_fixture(dir.path(), "pbp.csv")).unwrap();
    assert_eq!(df.shape(), (16, 11));
    assert_eq!(df.column("GAME_ID").unwrap().dtype(), &DataType::String);
    let games = frame::games(&df).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].season(), Some(2023));
}

#[test]
fn season_metrics_average_per_season() {
    let dir = tempfile::tempdir().unwrap();
    let pbp = frame::read_csv(&write_fixture(dir.path(), "pbp.csv")).unwrap();

    let (per_game, seasons) = metrics::season_metrics(&pbp, &MetricsOptions::default()).unwrap();
    assert_eq!(per_game.height(), 2);
    assert_eq!(f64_column(&per_game, "game_duration_min"), vec![Some(130.0), Some(60.0)]);
    assert_eq!(f64_column(&per_game, "halftime_len_min")[0], Some(15.0));
    assert_eq!(f64_column(&per_game, "q4_len_min")[0], Some(28.0));
    assert_eq!(seasons.height(), 1);
    assert_eq!(f64_column(&seasons, "Average Game Duration (min)"), vec![Some(95.0)]);

    let bounded = MetricsOptions {
        heuristic: Heuristic::Markers,
        duration_bounds: Some(DurationBounds::default()),
        progress_every: 1,
    };
    let (per_game, seasons) = metrics::season_metrics(&pbp, &bounded).unwrap();
    assert_eq!(per_game.height(), 1);
    assert_eq!(f64_column(&seasons, "Average Game Duration (min)"), vec![Some(130.0)]);

    let out = dir.path().join("nested").join("seasons.csv");
    frame::write_csv(&mut seasons.clone(), &out).unwrap();
    let written = frame::read_csv(&out).unwrap();
    assert_eq!(frame::column_names(&written)[0], "Season");
}

#[test]
fn outlier_games_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let pbp = frame::read_csv(&write_fixture(dir.path(), "pbp.csv")).unwrap();
    let report = summary::remove_outliers(&pbp, &DurationBounds::default()).unwrap();
    assert_eq!(report.summaries.len(), 2);
    assert_eq!(report.summaries[0].teams, "LVA @ SEA");
    assert_eq!(report.outliers.len(), 1);
    assert_eq!(report.outliers[0].game_id, "1022300002");
    assert_eq!(report.cleaned.height(), 12);
}

#[test]
fn anomalies_are_written_to_outdir() {
    let dir = tempfile::tempdir().unwrap();
    let pbp = frame::read_csv(&write_fixture(dir.path(), "pbp.csv")).unwrap();
    let mut report = anomalies::flag_anomalies(&pbp).unwrap();
    assert_eq!(report.anomalous_games(), 1);
    let short = &report.flags[1];
    assert_eq!(short.score_drops, 1);
    assert!(short.has_any_anomaly);
    assert_eq!(report.flags[0].timeouts_total, 1);

    let outdir = dir.path().join("out");
    report.write(&outdir).unwrap();
    let events = frame::read_csv(&outdir.join(anomalies::EVENT_ANOMALIES_FILE)).unwrap();
    assert_eq!(events.height(), 4);
    assert!(outdir.join(anomalies::GAME_FLAGS_FILE).exists());
}

#[test]
fn durations_feed_season_averages() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "wnba_2023_Aces_pbp.csv");
    let games = frame::games(&frame::read_csv(&path).unwrap()).unwrap();
    let rows = durations::game_boundaries(&games, "wnba_2023_Aces_pbp.csv");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].game_duration_minutes, Some(130.0));

    let cleaned = durations::clean_durations(&rows, &DurationBounds::default());
    assert_eq!(cleaned.len(), 1);

    let per_game = dir.path().join("durations.csv");
    frame::write_csv(&mut durations::boundaries_frame(&rows).unwrap(), &per_game).unwrap();
    let averages = durations::season_averages(&frame::read_csv(&per_game).unwrap(), None).unwrap();
    assert_eq!(f64_column(&averages, "avg_min"), vec![Some(95.0)]);
    assert_eq!(f64_column(&averages, "Season"), vec![Some(2023.0)]);
}

#[test]
fn densities_find_long_pauses() {
    let dir = tempfile::tempdir().unwrap();
    let pbp = frame::read_csv(&write_fixture(dir.path(), "pbp.csv")).unwrap();
    let (gaps, bursts) = density::densities(&pbp, &DensityOptions::default()).unwrap();
    assert_eq!(gaps.height(), 4);
    assert_eq!(bursts.height(), 0);
}

#[test]
fn missing_game_id_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "WCTIMESTRING\n7:00 PM\n").unwrap();
    let df = frame::read_csv(&path).unwrap();
    assert!(matches!(
        metrics::season_metrics(&df, &MetricsOptions::default()),
        Err(PbpError::MissingColumn(_))
    ));
}
