//! Columnar access to the caller's tabular data.
//!
//! Scoring functions read named columns through [`TabularSource`] and write
//! derived columns through [`TabularSink`]; [`Table`] is an in-memory
//! implementation of both.

use crate::{ScoreError, ensure_same_len};

/// Read access to named columns of equal length.
pub trait TabularSource {
    /// Number of rows shared by every column.
    fn num_rows(&self) -> usize;

    /// Numeric column `name`.
    fn numeric(&self, name: &str) -> Result<&[f64], ScoreError>;

    /// Categorical (label) column `name`.
    fn labels(&self, name: &str) -> Result<&[String], ScoreError>;
}

/// Write access for derived columns.
pub trait TabularSink {
    /// Adds (or replaces) numeric column `name`; its length must match the table.
    fn insert_numeric(&mut self, name: &str, values: Vec<f64>) -> Result<(), ScoreError>;
}

/// A single column of a [`Table`].
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Column {
    Numeric(Vec<f64>),
    Label(Vec<String>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Label(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        match self {
            Column::Numeric(values) => Column::Numeric(rows.iter().map(|&i| values[i]).collect()),
            Column::Label(values) => {
                Column::Label(rows.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }
}

/// In-memory table of named columns, kept in insertion order.
///
/// # Examples
///
/// ```
/// use ratewise_scoring::table::{Table, TabularSource as _};
/// # fn main() -> Result<(), ratewise_scoring::ScoreError> {
///
/// let table = Table::new()
///     .with_labels("title", vec!["A".into(), "B".into()])?
///     .with_numeric("vote_average", vec![7.5, 8.1])?;
/// assert_eq!(table.num_rows(), 2);
/// assert_eq!(table.numeric("vote_average")?, &[7.5, 8.1]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Table::insert`] for a numeric column.
    pub fn with_numeric(mut self, name: &str, values: Vec<f64>) -> Result<Self, ScoreError> {
        self.insert(name, Column::Numeric(values))?;
        Ok(self)
    }

    /// Builder form of [`Table::insert`] for a label column.
    pub fn with_labels(mut self, name: &str, values: Vec<String>) -> Result<Self, ScoreError> {
        self.insert(name, Column::Label(values))?;
        Ok(self)
    }

    /// Adds `column` under `name`, replacing an existing column of that name.
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn insert(&mut self, name: &str, column: Column) -> Result<(), ScoreError> {
        if let Some((_, first)) = self.columns.first() {
            let replaces_only_column = self.columns.len() == 1 && self.columns[0].0 == name;
            if !replaces_only_column {
                ensure_same_len(first.len(), column.len())?;
            }
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name.to_owned(), column)),
        }
        Ok(())
    }

    /// Column `name`, if present.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find_map(|(n, column)| (n == name).then_some(column))
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// All columns in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.columns
            .iter()
            .map(|(name, column)| (name.as_str(), column))
    }

    /// New table holding `rows` (in the given order) of every column.
    ///
    /// # Panics
    ///
    /// Panics if a row index is out of bounds.
    #[must_use]
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.take_rows(rows)))
                .collect(),
        }
    }
}

impl TabularSource for Table {
    fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, column)| column.len())
    }

    fn numeric(&self, name: &str) -> Result<&[f64], ScoreError> {
        match self.column(name) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(Column::Label(_)) => Err(ScoreError::WrongColumnType {
                name: name.to_owned(),
                expected: "numeric",
            }),
            None => Err(ScoreError::MissingColumn {
                name: name.to_owned(),
            }),
        }
    }

    fn labels(&self, name: &str) -> Result<&[String], ScoreError> {
        match self.column(name) {
            Some(Column::Label(values)) => Ok(values),
            Some(Column::Numeric(_)) => Err(ScoreError::WrongColumnType {
                name: name.to_owned(),
                expected: "label",
            }),
            None => Err(ScoreError::MissingColumn {
                name: name.to_owned(),
            }),
        }
    }
}

impl TabularSink for Table {
    fn insert_numeric(&mut self, name: &str, values: Vec<f64>) -> Result<(), ScoreError> {
        self.insert(name, Column::Numeric(values))
    }
}
