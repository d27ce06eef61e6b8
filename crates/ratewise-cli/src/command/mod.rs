use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{report::ReportOptions, util};

use self::{ab_test::AbTestArg, course::CourseArg, movies::MoviesArg, products::ProductsArg};

mod course;
mod movies;
mod products;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Scoring configuration JSON file; missing keys keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Rank movies by vote count, vote-weighted, IMDB-weighted and BAR scores
    Movies(#[clap(flatten)] MoviesArg),
    /// Time- and progress-weighted rating of a single course
    Course(#[clap(flatten)] CourseArg),
    /// Rank products by weighted sorting, BAR and hybrid scores
    Products(#[clap(flatten)] ProductsArg),
    /// Compare the Control and Test groups of an experiment
    AbTest(#[clap(flatten)] AbTestArg),
}

/// Presentation flags shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReportArg {
    /// Write the scored records (or the verdict) as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Rows shown per ranking
    #[arg(long, default_value_t = 20)]
    top: usize,
    /// Digits after the decimal point
    #[arg(long, default_value_t = 5)]
    precision: usize,
}

impl ReportArg {
    fn options(&self) -> ReportOptions {
        ReportOptions {
            float_precision: self.precision,
            max_rows: self.top,
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    util::init_tracing(args.verbose);
    let config = util::load_config(args.config.as_deref())?;

    match args.mode {
        Mode::Movies(arg) => movies::run(&arg, &config)?,
        Mode::Course(arg) => course::run(&arg, &config)?,
        Mode::Products(arg) => products::run(&arg, &config)?,
        Mode::AbTest(arg) => ab_test::run(&arg, &config)?,
    }
    Ok(())
}

#[cfg(test)]
fn parse_mode(args: &[&str]) -> Mode {
    CommandArgs::try_parse_from(std::iter::once("ratewise").chain(args.iter().copied()))
        .unwrap()
        .mode
}

/// Indices of the rows for which `keep` holds.
fn rows_where<T>(values: &[T], keep: impl Fn(&T) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| keep(v).then_some(i))
        .collect()
}
