//! JSON record files as scoring tables.
//!
//! Input files are JSON arrays of flat objects, one object per row. Numeric
//! columns accept numbers, numeric strings, `null` and missing keys (the last
//! two read as `NaN`). Label columns accept strings and numbers.

use std::path::Path;

use anyhow::{Context, bail};
use chrono::{NaiveDate, NaiveDateTime};
use ratewise_scoring::table::{Column, Table, TabularSource as _};
use serde_json::{Map, Value};

use crate::util;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, Default)]
pub(crate) struct Records {
    rows: Vec<Map<String, Value>>,
}

impl Records {
    pub(crate) fn read<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let rows = util::read_json_file("records", path)?;
        Ok(Self { rows })
    }

    #[cfg(test)]
    pub(crate) fn from_json(json: &str) -> Self {
        Self {
            rows: serde_json::from_str(json).unwrap(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    fn ensure_column(&self, name: &str) -> anyhow::Result<()> {
        if !self.rows.is_empty() && !self.rows.iter().any(|row| row.contains_key(name)) {
            bail!("Column '{name}' not found in any record");
        }
        Ok(())
    }

    pub(crate) fn numeric(&self, name: &str) -> anyhow::Result<Vec<f64>> {
        self.ensure_column(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match row.get(name) {
                None | Some(Value::Null) => Ok(f64::NAN),
                Some(Value::Number(n)) => n
                    .as_f64()
                    .with_context(|| format!("Row {i}: '{name}' is out of range")),
                Some(Value::String(s)) => s
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("Row {i}: '{name}' is not a number: {s:?}")),
                Some(other) => bail!("Row {i}: '{name}' is not a number: {other}"),
            })
            .collect()
    }

    pub(crate) fn labels(&self, name: &str) -> anyhow::Result<Vec<String>> {
        self.ensure_column(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match row.get(name) {
                None | Some(Value::Null) => Ok(String::new()),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(Value::Number(n)) => Ok(n.to_string()),
                Some(Value::Bool(b)) => Ok(b.to_string()),
                Some(other) => bail!("Row {i}: '{name}' is not a label: {other}"),
            })
            .collect()
    }

    pub(crate) fn timestamps(&self, name: &str) -> anyhow::Result<Vec<NaiveDateTime>> {
        self.ensure_column(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match row.get(name) {
                Some(Value::String(s)) => {
                    parse_datetime(s).with_context(|| format!("Row {i}: invalid '{name}'"))
                }
                _ => bail!("Row {i}: '{name}' must be a timestamp string"),
            })
            .collect()
    }

    /// Builds a table holding the given numeric and label columns.
    pub(crate) fn to_table(&self, numeric: &[&str], labels: &[&str]) -> anyhow::Result<Table> {
        let mut table = Table::new();
        for name in labels {
            table.insert(name, Column::Label(self.labels(name)?))?;
        }
        for name in numeric {
            table.insert(name, Column::Numeric(self.numeric(name)?))?;
        }
        Ok(table)
    }
}

/// Parses `YYYY-MM-DD[ HH:MM[:SS]]` (a `T` separator is accepted too).
pub(crate) fn parse_datetime(s: &str) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Unrecognized date/time: {s:?}"))?;
    Ok(date.and_time(chrono::NaiveTime::MIN))
}

/// Rows of `table` as JSON objects; `NaN` becomes `null`.
pub(crate) fn table_to_records(table: &Table) -> Vec<Map<String, Value>> {
    (0..table.num_rows())
        .map(|row| {
            table
                .columns()
                .map(|(name, column)| {
                    let value = match column {
                        Column::Numeric(values) => Value::from(values[row]),
                        Column::Label(values) => Value::from(values[row].clone()),
                    };
                    (name.to_owned(), value)
                })
                .collect()
        })
        .collect()
}
