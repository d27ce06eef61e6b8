//! Movie ranking command
//!
//! Compares four ways of ranking rated items: raw average, average scaled by
//! popularity, IMDB-style shrinkage toward the global mean, and the Bayesian
//! Average Rating of the per-star vote histogram.

use std::path::PathBuf;

use clap::Args;
use ratewise_scoring::{
    bayesian::{self, HistogramColumns},
    composite::{self, ShrinkageParams},
    config::ScoringConfig,
    normalize,
    table::{Table, TabularSink as _, TabularSource as _},
};
use ratewise_stats::summary::{self, DEFAULT_PERCENTILE_POINTS};

use crate::{
    command::{ReportArg, rows_where},
    dataset::{self, Records},
    report,
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct MoviesArg {
    /// Path to the movie records JSON file
    records: PathBuf,

    #[arg(long, default_value = "title")]
    title_column: String,
    #[arg(long, default_value = "vote_average")]
    rating_column: String,
    #[arg(long, default_value = "vote_count")]
    votes_column: String,

    /// Per-star vote count columns, lowest star first [default: one..ten]
    #[arg(long, value_delimiter = ',')]
    histogram_columns: Vec<String>,

    /// Skip the Bayesian Average Rating (for data without vote histograms)
    #[arg(long)]
    skip_bar: bool,

    /// Also rank only the movies with more than this many votes
    #[arg(long)]
    min_votes_filter: Option<f64>,

    /// Minimum vote threshold M for IMDB shrinkage (overrides the config)
    #[arg(long)]
    min_votes: Option<f64>,

    /// Confidence level for the BAR score (overrides the config)
    #[arg(long)]
    confidence: Option<f64>,

    #[clap(flatten)]
    report: ReportArg,
}

pub(crate) fn run(arg: &MoviesArg, config: &ScoringConfig) -> anyhow::Result<()> {
    let opts = arg.report.options();
    let records = Records::read(&arg.records)?;
    tracing::info!(rows = records.len(), "loaded movie records");

    let table = score(arg, config, &records)?;
    let title = arg.title_column.as_str();
    let rating = arg.rating_column.as_str();
    let votes = arg.votes_column.as_str();
    let vote_counts = table.numeric(votes)?;

    println!("Movie Ranking Report ({} movies)", table.num_rows());
    println!("==========================================\n");

    if let Some(summary) = summary::describe(vote_counts, &DEFAULT_PERCENTILE_POINTS) {
        report::print_summary(votes, &summary, opts);
        println!();
    }

    report::print_ranking("raw average", &table, title, rating, &[rating, votes], opts)?;
    println!();

    if let Some(threshold) = arg.min_votes_filter {
        let popular = table.take_rows(&rows_where(vote_counts, |v| *v > threshold));
        let heading = format!("more than {threshold} votes");
        report::print_ranking(&heading, &popular, title, rating, &[rating, votes], opts)?;
        println!();
    }

    for column in SCORES {
        if table.column(column).is_none() {
            continue;
        }
        let shown = [rating, votes, column];
        report::print_ranking("scored", &table, title, column, &shown, opts)?;
        println!();
    }

    if let Some(path) = &arg.report.output {
        Output::save_json(&dataset::table_to_records(&table), Some(path.as_path()))?;
        println!("Scored movies saved to: {}", path.display());
    }

    Ok(())
}

const SCORES: [&str; 3] = ["average_count_score", "weighted_rating", "bar_score"];

/// Loads the movie columns and appends the popularity, shrinkage and
/// (unless skipped) BAR scores.
fn score(arg: &MoviesArg, config: &ScoringConfig, records: &Records) -> anyhow::Result<Table> {
    let histogram = if arg.histogram_columns.is_empty() {
        HistogramColumns::ten_level()
    } else {
        HistogramColumns::new(arg.histogram_columns.iter().cloned())
    };

    let rating = arg.rating_column.as_str();
    let votes = arg.votes_column.as_str();
    let mut numeric = vec![rating, votes];
    if !arg.skip_bar {
        numeric.extend(histogram.names().iter().map(String::as_str));
    }
    let mut table = records.to_table(&numeric, &[arg.title_column.as_str()])?;

    let ratings = table.numeric(rating)?.to_vec();
    let vote_counts = table.numeric(votes)?.to_vec();

    let vote_count_score = normalize::normalize_into(&vote_counts, config.vote_count_range)?;
    let average_count_score = composite::vote_weighted_column(&ratings, &vote_count_score)?;
    table.insert_numeric("vote_count_score", vote_count_score)?;
    table.insert_numeric("average_count_score", average_count_score)?;

    let min_votes = arg.min_votes.unwrap_or(config.min_votes);
    let params = ShrinkageParams::from_ratings(&ratings, min_votes)?;
    tracing::debug!(?params, "shrinkage prior");
    let weighted_rating = composite::imdb_weighted_column(&ratings, &vote_counts, params)?;
    table.insert_numeric("weighted_rating", weighted_rating)?;

    if !arg.skip_bar {
        let confidence = arg.confidence.unwrap_or(config.confidence_level);
        let bar_scores = bayesian::bar_score_column(&table, &histogram, confidence)?;
        table.insert_numeric("bar_score", bar_scores)?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::command::{Mode, parse_mode};

    fn movies_arg(extra: &[&str]) -> MoviesArg {
        let mut args = vec!["movies", "movies.json"];
        args.extend_from_slice(extra);
        match parse_mode(&args) {
            Mode::Movies(arg) => arg,
            mode => panic!("unexpected mode: {mode:?}"),
        }
    }

    fn sample() -> Records {
        Records::from_json(
            r#"[
                {"title": "Blockbuster", "vote_average": 8.0, "vote_count": 100,
                 "one": 0, "two": 0, "three": 0, "four": 0, "five": 0,
                 "six": 0, "seven": 10, "eight": 40, "nine": 30, "ten": 20},
                {"title": "Cult Classic", "vote_average": 9.0, "vote_count": 10,
                 "one": 0, "two": 0, "three": 0, "four": 0, "five": 0,
                 "six": 0, "seven": 0, "eight": 0, "nine": 10, "ten": 0},
                {"title": "Unrated", "vote_average": 4.0, "vote_count": 0,
                 "one": 0, "two": 0, "three": 0, "four": 0, "five": 0,
                 "six": 0, "seven": 0, "eight": 0, "nine": 0, "ten": 0}
            ]"#,
        )
    }

    #[test]
    fn test_score_appends_every_column() {
        let arg = movies_arg(&["--min-votes", "10"]);
        let config = ScoringConfig::default();
        let table = score(&arg, &config, &sample()).unwrap();

        let vote_count_score = table.numeric("vote_count_score").unwrap();
        assert_eq!(vote_count_score[0], 10.0);
        assert_abs_diff_eq!(vote_count_score[1], 1.9, epsilon = 1e-12);
        assert_eq!(vote_count_score[2], 1.0);
        assert_abs_diff_eq!(
            table.numeric("average_count_score").unwrap()[1],
            9.0 * 1.9,
            epsilon = 1e-12
        );

        // global mean 7, prior of 10 votes
        let weighted = table.numeric("weighted_rating").unwrap();
        assert_abs_diff_eq!(weighted[1], 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(weighted[2], 7.0, epsilon = 1e-12);

        let bar = table.numeric("bar_score").unwrap();
        assert_eq!(bar[2], 0.0);
        assert!(bar[0] > bar[1], "{bar:?}");
    }

    #[test]
    fn test_skip_bar_needs_no_histogram() {
        let records = Records::from_json(
            r#"[
                {"title": "A", "vote_average": 7.0, "vote_count": 3000},
                {"title": "B", "vote_average": 6.0, "vote_count": 10}
            ]"#,
        );
        let arg = movies_arg(&["--skip-bar"]);
        let config = ScoringConfig::default();
        let table = score(&arg, &config, &records).unwrap();
        assert!(table.column("bar_score").is_none());
        assert!(table.column("weighted_rating").is_some());
    }
}
