use std::{
    cmp::Reverse, error::Error as StdError, fs::File, io, num::NonZeroUsize, path::PathBuf,
};

use clap::Parser as _;
use ordered_float::OrderedFloat;
use ppr::{
    EquilibriumSolver, InitialRatings, PerformanceRatingType, Standing, Termination, Tournament,
};
use ppr_tools::game::RawGame;
use serde::Serialize;

#[derive(clap::Parser)]
struct Opt {
    /// Games CSV files, as written by pgn_to_games. Reads stdin if none
    /// are given.
    inputs: Vec<PathBuf>,
    #[clap(long, default_value = "standard")]
    performance_rating_type: PerformanceRatingType,
    #[clap(long, default_value = "1000")]
    max_iterations: NonZeroUsize,
    #[clap(long, default_value = "average_rating")]
    initial_ratings: InitialRatings,
    /// Tournament average rating to use instead of the mean of all recorded
    /// ratings.
    #[clap(long)]
    tournament_average_rating: Option<f64>,
    /// Also write the report to this file.
    #[clap(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Rating")]
    rating: f64,
    #[serde(rename = "Points")]
    points: f64,
    #[serde(rename = "TPR")]
    tpr: Option<i64>,
    #[serde(rename = "PPR")]
    ppr: Option<i64>,
}

impl<'a> From<&Standing<'a>> for ReportRow<'a> {
    fn from(standing: &Standing<'a>) -> ReportRow<'a> {
        ReportRow {
            rank: standing.rank,
            name: standing.name,
            rating: f64::from(standing.rating),
            points: standing.points.value(),
            tpr: standing.tpr,
            ppr: standing.ppr,
        }
    }
}

fn read_games<R: io::Read>(reader: R, games: &mut Vec<RawGame>) -> csv::Result<()> {
    let mut reader = csv::Reader::from_reader(reader);
    for game in reader.deserialize() {
        games.push(game?);
    }
    Ok(())
}

fn write_report<W: io::Write>(writer: W, standings: &[Standing<'_>]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for standing in standings {
        writer.serialize(ReportRow::from(standing))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn StdError>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::parse();

    let mut games = Vec::new();
    if opt.inputs.is_empty() {
        read_games(io::stdin().lock(), &mut games)?;
    } else {
        for path in &opt.inputs {
            read_games(File::open(path)?, &mut games)?;
        }
    }
    log::info!("read {} games", games.len());

    let mut builder = Tournament::builder();
    builder.average_rating_override(opt.tournament_average_rating);
    for game in &games {
        builder.record(game.record());
    }
    let tournament = builder.build()?;

    let solver = EquilibriumSolver::builder()
        .performance_rating_type(opt.performance_rating_type)
        .max_iterations(opt.max_iterations.get())
        .initial_ratings(opt.initial_ratings)
        .build();
    let equilibrium = solver.solve(&tournament)?;

    if let Termination::MaxIterationsReached { iterations } = equilibrium.termination() {
        log::warn!("no equilibrium after {iterations} iterations, reporting last estimates");
    }

    let mut standings = equilibrium.standings();
    standings.sort_by_key(|standing| Reverse(OrderedFloat(standing.points.value())));

    if let Some(ref path) = opt.output {
        write_report(File::create(path)?, &standings)?;
        log::info!("performance ratings exported to {}", path.display());
    }
    write_report(io::stdout().lock(), &standings)?;

    Ok(())
}
