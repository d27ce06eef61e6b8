//! Product sorting command
//!
//! Ranks products by engagement-weighted sorting score, by the Bayesian
//! Average Rating of their point histogram, and by a blend of both.

use std::path::PathBuf;

use clap::Args;
use ratewise_scoring::{
    bayesian::{self, HistogramColumns},
    composite,
    config::ScoringConfig,
    normalize,
    table::{Table, TabularSink as _, TabularSource as _},
};

use crate::{
    command::{ReportArg, rows_where},
    dataset::{self, Records},
    report::{self, ReportOptions},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ProductsArg {
    /// Path to the product records JSON file
    records: PathBuf,

    #[arg(long, default_value = "course_name")]
    name_column: String,
    #[arg(long, default_value = "rating")]
    rating_column: String,
    #[arg(long, default_value = "purchase_count")]
    purchase_column: String,
    #[arg(long, default_value = "comment_count")]
    comment_column: String,

    /// Per-point vote count columns, lowest point first [default: 1_point..5_point]
    #[arg(long, value_delimiter = ',')]
    histogram_columns: Vec<String>,

    /// Also rank only the products whose name contains this text
    #[arg(long)]
    name_contains: Option<String>,

    /// Confidence level for the BAR score (overrides the config)
    #[arg(long)]
    confidence: Option<f64>,

    #[clap(flatten)]
    report: ReportArg,
}

const PURCHASE_SCALED: &str = "purchase_count_scaled";
const COMMENT_SCALED: &str = "comment_count_scaled";
const WEIGHTED_SORTING_SCORE: &str = "weighted_sorting_score";
const BAR_SCORE: &str = "bar_score";
const HYBRID_SORTING_SCORE: &str = "hybrid_sorting_score";

pub(crate) fn run(arg: &ProductsArg, config: &ScoringConfig) -> anyhow::Result<()> {
    let opts = arg.report.options();
    let records = Records::read(&arg.records)?;
    tracing::info!(rows = records.len(), "loaded product records");

    let table = score(arg, config, &records)?;
    let rating = arg.rating_column.as_str();
    let raw = [rating, arg.purchase_column.as_str(), arg.comment_column.as_str()];

    println!("Product Sorting Report ({} products)", table.num_rows());
    println!("==========================================\n");

    for key in raw {
        report::print_ranking("raw", &table, &arg.name_column, key, &raw, opts)?;
        println!();
    }

    print_scored(&table, &arg.name_column, rating, "all products", opts)?;

    if let Some(needle) = &arg.name_contains {
        let names = table.labels(&arg.name_column)?;
        let matching = table.take_rows(&rows_where(names, |name| name.contains(needle.as_str())));
        let title = format!("name contains {needle:?}");
        print_scored(&matching, &arg.name_column, rating, &title, opts)?;
    }

    if let Some(path) = &arg.report.output {
        Output::save_json(&dataset::table_to_records(&table), Some(path.as_path()))?;
        println!("Scored products saved to: {}", path.display());
    }
    Ok(())
}

/// Loads the product columns and appends the scaled counts and the
/// weighted sorting, BAR and hybrid scores.
fn score(arg: &ProductsArg, config: &ScoringConfig, records: &Records) -> anyhow::Result<Table> {
    let histogram = if arg.histogram_columns.is_empty() {
        HistogramColumns::five_point()
    } else {
        HistogramColumns::new(arg.histogram_columns.iter().cloned())
    };

    let rating = arg.rating_column.as_str();
    let purchases = arg.purchase_column.as_str();
    let comments = arg.comment_column.as_str();
    let mut numeric = vec![rating, purchases, comments];
    numeric.extend(histogram.names().iter().map(String::as_str));
    let mut table = records.to_table(&numeric, &[arg.name_column.as_str()])?;

    let range = config.engagement_range;
    let purchase_scaled = normalize::normalize_into(table.numeric(purchases)?, range)?;
    let comment_scaled = normalize::normalize_into(table.numeric(comments)?, range)?;
    let wss = composite::weighted_sorting_column(
        &comment_scaled,
        &purchase_scaled,
        table.numeric(rating)?,
        config.sorting_weights,
    )?;
    table.insert_numeric(PURCHASE_SCALED, purchase_scaled)?;
    table.insert_numeric(COMMENT_SCALED, comment_scaled)?;

    let confidence = arg.confidence.unwrap_or(config.confidence_level);
    let bar_scores = bayesian::bar_score_column(&table, &histogram, confidence)?;
    let hybrid = composite::hybrid_column(&bar_scores, &wss, config.hybrid_weights)?;
    table.insert_numeric(WEIGHTED_SORTING_SCORE, wss)?;
    table.insert_numeric(BAR_SCORE, bar_scores)?;
    table.insert_numeric(HYBRID_SORTING_SCORE, hybrid)?;

    Ok(table)
}

fn print_scored(
    table: &Table,
    name_column: &str,
    rating: &str,
    title: &str,
    opts: ReportOptions,
) -> anyhow::Result<()> {
    for score in [WEIGHTED_SORTING_SCORE, BAR_SCORE, HYBRID_SORTING_SCORE] {
        report::print_ranking(
            title,
            table,
            name_column,
            score,
            &[rating, WEIGHTED_SORTING_SCORE, BAR_SCORE, HYBRID_SORTING_SCORE],
            opts,
        )?;
        println!();
    }
    Ok(())
}
