//! Course rating command
//!
//! Reports the plain mean rating of one course's reviews next to the
//! time-weighted, progress-weighted and combined course ratings.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::Args;
use ratewise_scoring::{
    bucket::{self, BucketSpec, BucketSummary},
    composite::{self, CourseWeights},
    config::ScoringConfig,
};
use ratewise_stats::descriptive;
use serde::Serialize;

use crate::{
    command::ReportArg,
    dataset::{self, Records},
    report::{self, ReportOptions},
    util::Output,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct CourseArg {
    /// Path to the review records JSON file
    records: PathBuf,

    /// Point in time the review ages are measured from, e.g. "2021-02-10 00:00:00"
    #[arg(long, value_parser = dataset::parse_datetime)]
    reference: NaiveDateTime,

    #[arg(long, default_value = "Rating")]
    rating_column: String,
    #[arg(long, default_value = "Timestamp")]
    timestamp_column: String,
    #[arg(long, default_value = "Progress")]
    progress_column: String,

    /// Weight of the time-based average in the course rating (overrides the config)
    #[arg(long)]
    time_weight: Option<f64>,
    /// Weight of the user-based average in the course rating (overrides the config)
    #[arg(long)]
    user_weight: Option<f64>,

    #[clap(flatten)]
    report: ReportArg,
}

#[derive(Debug, Clone, Serialize)]
struct BucketedAverage {
    average: f64,
    buckets: Vec<BucketSummary>,
}

#[derive(Debug, Clone, Serialize)]
struct CourseReport {
    reviews: usize,
    reference: NaiveDateTime,
    mean: f64,
    time_based: BucketedAverage,
    short_time_based: BucketedAverage,
    user_based: BucketedAverage,
    course_weights: CourseWeights,
    course_weighted_rating: f64,
}

pub(crate) fn run(arg: &CourseArg, config: &ScoringConfig) -> anyhow::Result<()> {
    let records = Records::read(&arg.records)?;
    tracing::info!(rows = records.len(), "loaded review records");

    let course = build_report(arg, config, &records)?;
    print_report(&course, arg.report.options());

    if let Some(path) = &arg.report.output {
        Output::save_json(&course, Some(path.as_path()))?;
        println!("\nCourse report saved to: {}", path.display());
    }
    Ok(())
}

fn build_report(
    arg: &CourseArg,
    config: &ScoringConfig,
    records: &Records,
) -> anyhow::Result<CourseReport> {
    let ratings = records.numeric(&arg.rating_column)?;
    let days = bucket::elapsed_days(&records.timestamps(&arg.timestamp_column)?, arg.reference);
    let progress = records.numeric(&arg.progress_column)?;

    let rated = ratings
        .iter()
        .copied()
        .filter(|r| !r.is_nan())
        .collect::<Vec<_>>();
    let mean = descriptive::mean(&rated).unwrap_or(f64::NAN);

    let time_based = bucketed(&ratings, &days, &config.time_buckets)?;
    let short_time_based = bucketed(&ratings, &days, &config.short_time_buckets)?;
    let user_based = bucketed(&ratings, &progress, &config.progress_buckets)?;

    let course_weights = CourseWeights {
        time: arg.time_weight.unwrap_or(config.course_weights.time),
        user: arg.user_weight.unwrap_or(config.course_weights.user),
    };
    let course_weighted_rating = composite::course_weighted_rating(
        short_time_based.average,
        user_based.average,
        course_weights.time,
        course_weights.user,
    );

    Ok(CourseReport {
        reviews: records.len(),
        reference: arg.reference,
        mean,
        time_based,
        short_time_based,
        user_based,
        course_weights,
        course_weighted_rating,
    })
}

fn bucketed(values: &[f64], keys: &[f64], spec: &BucketSpec) -> anyhow::Result<BucketedAverage> {
    let buckets = bucket::bucket_summaries(values, keys, spec)?;
    let average = buckets.iter().map(BucketSummary::contribution).sum();
    Ok(BucketedAverage { average, buckets })
}

fn print_report(course: &CourseReport, opts: ReportOptions) {
    let p = opts.float_precision;
    println!(
        "Course Rating Report ({} reviews, reference {})",
        course.reviews, course.reference
    );
    println!("==========================================\n");

    println!("Average rating: {}\n", report::format_float(course.mean, p));

    report::print_buckets(
        "Time-based weighted average (days since review)",
        &course.time_based.buckets,
        course.time_based.average,
        opts,
    );
    println!();
    report::print_buckets(
        "User-based weighted average (progress %)",
        &course.user_based.buckets,
        course.user_based.average,
        opts,
    );
    println!();
    report::print_buckets(
        "Short time-based weighted average (days since review)",
        &course.short_time_based.buckets,
        course.short_time_based.average,
        opts,
    );
    println!();
    println!(
        "Course weighted rating ({}% time / {}% user): {}",
        course.course_weights.time,
        course.course_weights.user,
        report::format_float(course.course_weighted_rating, p)
    );
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::command::{Mode, parse_mode};

    fn course_arg(extra: &[&str]) -> CourseArg {
        let mut args = vec!["course", "reviews.json", "--reference", "2021-02-10 00:00:00"];
        args.extend_from_slice(extra);
        match parse_mode(&args) {
            Mode::Course(arg) => arg,
            mode => panic!("unexpected mode: {mode:?}"),
        }
    }

    fn sample() -> Records {
        Records::from_json(
            r#"[
                {"Rating": 5.0, "Timestamp": "2021-02-05 00:00:00", "Progress": 80.0},
                {"Rating": 3.0, "Timestamp": "2020-12-31 00:00:00", "Progress": 50.0},
                {"Rating": 4.0, "Timestamp": "2020-11-01 00:00:00", "Progress": 20.0},
                {"Rating": 2.0, "Timestamp": "2020-06-01 00:00:00", "Progress": 5.0}
            ]"#,
        )
    }

    #[test]
    fn test_build_report_default_weights() {
        let config = ScoringConfig::default();
        let course = build_report(&course_arg(&[]), &config, &sample()).unwrap();

        assert_eq!(course.reviews, 4);
        assert_abs_diff_eq!(course.mean, 3.5, epsilon = 1e-12);
        // 5, 3, 4, 2 fall one per bucket at 5, 41, 101 and 254 days
        assert_abs_diff_eq!(course.time_based.average, 3.58, epsilon = 1e-12);
        // 5 * 0.30 + 3 * 0.35 + mean(4, 2) * 0.35
        assert_abs_diff_eq!(course.short_time_based.average, 3.6, epsilon = 1e-12);
        assert_abs_diff_eq!(course.user_based.average, 3.58, epsilon = 1e-12);
        assert_abs_diff_eq!(course.course_weighted_rating, 3.59, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_overrides() {
        let arg = course_arg(&["--time-weight", "100", "--user-weight", "0"]);
        let config = ScoringConfig::default();
        let course = build_report(&arg, &config, &sample()).unwrap();
        assert_abs_diff_eq!(course.course_weighted_rating, 3.6, epsilon = 1e-12);
    }
}
