//! Console presentation of scored tables, summaries and bucket breakdowns.

use std::cmp::Ordering;

use anyhow::Context;
use ratewise_scoring::{
    bucket::BucketSummary,
    table::{Table, TabularSource as _},
};
use ratewise_stats::summary::Summary;

const LABEL_WIDTH: usize = 40;
const VALUE_WIDTH: usize = 12;

/// How tables are rendered; passed to every printing function.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportOptions {
    /// Digits after the decimal point.
    pub float_precision: usize,
    /// Rows shown per ranking.
    pub max_rows: usize,
}

pub(crate) fn format_float(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else {
        format!("{value:.precision$}")
    }
}

/// Row indices ordered by `values`, highest first, `NaN` last.
///
/// Ties keep their original row order.
pub(crate) fn descending_order(values: &[f64]) -> Vec<usize> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| match (values[a].is_nan(), values[b].is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => values[b].total_cmp(&values[a]),
    });
    order
}

fn truncate(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        label.to_owned()
    } else {
        let mut s = label.chars().take(width - 1).collect::<String>();
        s.push('~');
        s
    }
}

/// Prints the top rows of `table` ranked by `sort_by`.
pub(crate) fn print_ranking(
    title: &str,
    table: &Table,
    label_column: &str,
    sort_by: &str,
    columns: &[&str],
    opts: ReportOptions,
) -> anyhow::Result<()> {
    let labels = table.labels(label_column)?;
    let keys = table.numeric(sort_by)?;
    let values = columns
        .iter()
        .map(|name| {
            table
                .numeric(name)
                .with_context(|| format!("Cannot display column '{name}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    println!(
        "Top {} by {sort_by}: {title}",
        opts.max_rows.min(table.num_rows())
    );
    print!("  {:<LABEL_WIDTH$}", label_column);
    for name in columns {
        let width = name.len().max(VALUE_WIDTH);
        print!(" {name:>width$}");
    }
    println!();
    let total_width = LABEL_WIDTH
        + columns
            .iter()
            .map(|name| name.len().max(VALUE_WIDTH) + 1)
            .sum::<usize>();
    println!("  {}", "-".repeat(total_width));

    for row in descending_order(keys).into_iter().take(opts.max_rows) {
        print!("  {:<LABEL_WIDTH$}", truncate(&labels[row], LABEL_WIDTH));
        for (name, column) in columns.iter().zip(&values) {
            let width = name.len().max(VALUE_WIDTH);
            print!(
                " {:>width$}",
                format_float(column[row], opts.float_precision)
            );
        }
        println!();
    }
    Ok(())
}

/// Prints count, mean, spread and percentiles of one column.
pub(crate) fn print_summary(name: &str, summary: &Summary, opts: ReportOptions) {
    let p = opts.float_precision;
    let stats = &summary.stats;
    println!("Summary of {name}:");
    println!("  {:<8} {:>14}", "count", stats.count);
    println!("  {:<8} {:>14}", "mean", format_float(stats.mean, p));
    println!("  {:<8} {:>14}", "std", format_float(stats.std_dev, p));
    println!("  {:<8} {:>14}", "min", format_float(stats.min, p));
    for (point, value) in summary.percentiles.iter() {
        let label = format!("{point}%");
        println!("  {label:<8} {:>14}", format_float(value, p));
    }
    println!("  {:<8} {:>14}", "max", format_float(stats.max, p));
}

/// Prints one line per bucket and the resulting weighted average.
pub(crate) fn print_buckets(
    title: &str,
    buckets: &[BucketSummary],
    total: f64,
    opts: ReportOptions,
) {
    let p = opts.float_precision;
    println!("{title}:");
    println!(
        "  {:<14} {:>8} {:>8} {:>12} {:>14}",
        "Range", "Weight", "Count", "Mean", "Contribution"
    );
    println!("  {}", "-".repeat(60));
    for bucket in buckets {
        println!(
            "  {:<14} {:>8} {:>8} {:>12} {:>14}",
            bucket.range.to_string(),
            bucket.weight,
            bucket.count,
            format_float(bucket.mean, p),
            format_float(bucket.contribution(), p),
        );
    }
    println!("  {:<14} {:>45}", "Weighted", format_float(total, p));
}
