use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pbp_tools::nba::endpoints::{fetch_games, FetchOptions, LeagueGameFinder};
use pbp_tools::nba::params::{LeagueID, Season, TeamID};
use pbp_tools::pbp::density::{self, DensityOptions};
use pbp_tools::pbp::describe::{self, DurationStats};
use pbp_tools::pbp::metrics::{self, DurationBounds, Heuristic, MetricsOptions};
use pbp_tools::pbp::{anomalies, durations, frame, season, summary};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Download, clean and summarise basketball play-by-play data", long_about = None)]
struct PbpCli {
    #[clap(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download the play-by-play of a team's season, or of listed games
    Fetch {
        #[clap(short, long, default_value = "nba")]
        league: LeagueID,

        /// `2006-07` for the NBA, `2014` for the WNBA
        #[clap(short, long)]
        season: Option<String>,

        #[clap(short, long)]
        team_id: Option<i64>,

        /// Fetch these games instead of asking the game finder
        #[clap(short, long)]
        game_id: Vec<String>,

        /// CSV to write; the frame is printed when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Seconds to wait before each request
        #[clap(long, default_value = "3")]
        delay_secs: u64,
    },
    /// Per-game summary, and the play-by-play without games of implausible length
    Summarize {
        #[clap(short, long)]
        input: PathBuf,

        #[clap(long, default_value = "wnba_game_times.csv")]
        summary_out: PathBuf,

        #[clap(long, default_value = "wnba_data_clean.csv")]
        cleaned_out: PathBuf,

        #[clap(long, default_value = "90,180")]
        bounds: DurationBounds,

        /// How many outlier games to print
        #[clap(long, default_value = "50")]
        show: usize,
    },
    /// Data quality flags per game plus the rows of flagged games
    FlagAnomalies {
        #[clap(short, long)]
        input: PathBuf,

        #[clap(long, default_value = "./out")]
        outdir: PathBuf,
    },
    /// Per-game timing metrics averaged by season
    SeasonMetrics {
        #[clap(short, long)]
        input: PathBuf,

        #[clap(short, long)]
        output: PathBuf,

        #[clap(long)]
        per_game_out: Option<PathBuf>,

        /// markers or boundaries
        #[clap(long, default_value = "boundaries")]
        heuristic: Heuristic,

        /// Keep only games whose duration lies in `min,max` minutes
        #[clap(long)]
        duration_bounds: Option<DurationBounds>,

        #[clap(long, default_value = "1000")]
        progress_every: usize,
    },
    /// Long pauses between events and bursts of events in a short time
    Densities {
        #[clap(short, long)]
        input: PathBuf,

        #[clap(long, default_value = "long_gaps.csv")]
        gaps_out: PathBuf,

        #[clap(long, default_value = "event_bursts.csv")]
        bursts_out: PathBuf,

        #[clap(long, default_value = "20")]
        gap_minutes: i64,

        #[clap(long, default_value = "1")]
        gap_step: usize,

        #[clap(long, default_value = "0")]
        burst_minutes: i64,

        #[clap(long, default_value = "10")]
        burst_window: usize,
    },
    /// Game lengths from the start and end of regulation rows of per-team files
    Durations {
        #[clap(short, long, required = true)]
        input: Vec<PathBuf>,

        #[clap(short, long)]
        output: PathBuf,

        /// Bounded and deduplicated copy of the output
        #[clap(long)]
        cleaned_out: Option<PathBuf>,

        #[clap(long, default_value = "90,180")]
        bounds: DurationBounds,
    },
    /// Average game duration by season from a per-game or aggregated table
    SeasonDurations {
        #[clap(short, long)]
        input: PathBuf,

        /// Play-by-play with `GAME_ID` and `_year`, used to find each game's season
        #[clap(long)]
        pbp: Option<PathBuf>,

        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Descriptive statistics of game durations
    Describe {
        #[clap(short, long)]
        input: PathBuf,

        #[clap(long, default_value = "duration_min")]
        column: String,

        #[clap(long, default_value = "90,180")]
        bounds: DurationBounds,

        #[clap(long)]
        cleaned_out: Option<PathBuf>,
    },
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(log::LevelFilter::Info),
    };
    builder.init();
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> Result<()> {
    init_logger();
    let args = PbpCli::parse();
    match args.cmd {
        Commands::Fetch { league, season, team_id, game_id, output, delay_secs } => {
            let game_ids = if game_id.is_empty() {
                let finder = LeagueGameFinder {
                    league_id: league,
                    season: season.map(Season::S).unwrap_or_default(),
                    team_id: team_id.map(TeamID::ID),
                };
                finder.game_ids()?
            } else {
                game_id
            };
            info!("{} games to fetch", game_ids.len());
            let options = FetchOptions {
                delay: Duration::from_secs(delay_secs),
            };
            let mut pbp = fetch_games(&game_ids, &options)?;
            match output {
                Some(path) => frame::write_csv(&mut pbp, &path)?,
                None => println!("{}", pbp),
            }
        }
        Commands::Summarize { input, summary_out, cleaned_out, bounds, show } => {
            let pbp = frame::read_csv(&input)?;
            let mut report = summary::remove_outliers(&pbp, &bounds)?;
            println!(
                "Outlier games outside [{}] minutes: {} of {}",
                bounds,
                report.outliers.len(),
                report.summaries.len()
            );
            if !report.outliers.is_empty() {
                println!("{}", report.outlier_table(show));
            }
            frame::write_csv(&mut summary::summary_frame(&report.summaries)?, &summary_out)?;
            frame::write_csv(&mut report.cleaned, &cleaned_out)?;
        }
        Commands::FlagAnomalies { input, outdir } => {
            let pbp = frame::read_csv(&input)?;
            let mut report = anomalies::flag_anomalies(&pbp)?;
            let (flags_path, events_path) = report.write(&outdir)?;
            println!(
                "{} of {} games flagged, see {} and {}",
                report.anomalous_games(),
                report.flags.len(),
                flags_path.display(),
                events_path.display()
            );
        }
        Commands::SeasonMetrics { input, output, per_game_out, heuristic, duration_bounds, progress_every } => {
            let pbp = frame::read_csv(&input)?;
            let options = MetricsOptions {
                heuristic,
                duration_bounds,
                progress_every,
            };
            let (mut per_game, mut seasons) = metrics::season_metrics(&pbp, &options)?;
            if let Some(path) = per_game_out {
                frame::write_csv(&mut per_game, &path)?;
            }
            frame::write_csv(&mut seasons, &output)?;
            println!("{}", seasons);
        }
        Commands::Densities {
            input,
            gaps_out,
            bursts_out,
            gap_minutes,
            gap_step,
            burst_minutes,
            burst_window,
        } => {
            let pbp = frame::read_csv(&input)?;
            let options = DensityOptions {
                gap_minutes,
                gap_step,
                burst_minutes,
                burst_window,
            };
            let (mut gaps, mut bursts) = density::densities(&pbp, &options)?;
            frame::write_csv(&mut gaps, &gaps_out)?;
            frame::write_csv(&mut bursts, &bursts_out)?;
        }
        Commands::Durations { input, output, cleaned_out, bounds } => {
            let mut rows = Vec::new();
            for path in &input {
                let label = source_label(path);
                if season::from_file_name(&label).is_none() {
                    info!("{}: no season in the file name, using the game ids", label);
                }
                let games = frame::games(&frame::read_csv(path)?)?;
                rows.extend(durations::game_boundaries(&games, &label));
            }
            frame::write_csv(&mut durations::boundaries_frame(&rows)?, &output)?;
            if let Some(path) = cleaned_out {
                let cleaned = durations::clean_durations(&rows, &bounds);
                frame::write_csv(&mut durations::boundaries_frame(&cleaned)?, &path)?;
            }
        }
        Commands::SeasonDurations { input, pbp, output } => {
            let table = frame::read_csv(&input)?;
            let lookup = pbp.as_deref().map(frame::read_csv).transpose()?;
            let mut averages = durations::season_averages(&table, lookup.as_ref())?;
            println!("{}", averages);
            if let Some(path) = output {
                frame::write_csv(&mut averages, &path)?;
            }
        }
        Commands::Describe { input, column, bounds, cleaned_out } => {
            let table = frame::read_csv(&input)?;
            let (mut kept, values) = describe::within_bounds(&table, &column, &bounds)?;
            if let Some(path) = cleaned_out {
                frame::write_csv(&mut kept, &path)?;
            }
            match DurationStats::from_values(&values) {
                Some(stats) => println!("{}", stats.table()),
                None => println!("No durations within [{}] minutes", bounds),
            }
        }
    }
    Ok(())
}
