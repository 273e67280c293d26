/*
    Orrery, typed automation for astrodynamics applications
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! Tabular time-series results and the extractor that fills them.

use crate::model::{ColumnData, ModelError};
use crate::time::{Duration, Epoch};
use snafu::prelude::*;
use std::fmt;
use std::path::Path;

mod extract;
pub use extract::{extract, extract_fixed};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExtractionError {
    #[snafu(display("window stop {stop} is not after start {start}"))]
    WindowOrder { start: Epoch, stop: Epoch },
    #[snafu(display("step must be strictly positive, got {step}"))]
    StepNotPositive { step: Duration },
    #[snafu(display("no elements requested"))]
    NoElements,
    #[snafu(display("unknown element `{element}` on provider `{provider}`"))]
    UnknownElement { provider: String, element: String },
    #[snafu(display("engine rejected the element query: {source}"))]
    Query { source: ModelError },
    #[snafu(display(
        "engine returned {got} columns of ragged lengths for {requested} requested elements"
    ))]
    RaggedColumns { requested: usize, got: usize },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExportError {
    #[snafu(display("could not write the series table: {source}"))]
    CsvWrite { source: csv::Error },
}

/// One named column of a series table.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesColumn {
    name: String,
    data: ColumnData,
}

impl SeriesColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    fn fmt_value(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Reals(v) => format!("{:.6}", v[row]),
            ColumnData::Epochs(v) => format!("{}", v[row]),
        }
    }
}

/// An immutable table of named, equally long columns produced by one element
/// query. Columns appear in the order they were requested.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesTable {
    columns: Vec<SeriesColumn>,
    rows: usize,
}

impl SeriesTable {
    /// Assembles a table from the engine's raw columns. The engine's sampling
    /// is authoritative for the row count; this only checks that the columns
    /// agree with each other.
    pub(crate) fn assemble(
        names: &[String],
        data: Vec<ColumnData>,
    ) -> Result<Self, ExtractionError> {
        ensure!(
            names.len() == data.len(),
            RaggedColumnsSnafu {
                requested: names.len(),
                got: data.len(),
            }
        );
        let rows = data.first().map_or(0, ColumnData::len);
        ensure!(
            data.iter().all(|col| col.len() == rows),
            RaggedColumnsSnafu {
                requested: names.len(),
                got: data.len(),
            }
        );
        Ok(Self {
            columns: names
                .iter()
                .zip(data)
                .map(|(name, data)| SeriesColumn {
                    name: name.clone(),
                    data,
                })
                .collect(),
            rows,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| &c.data)
    }

    /// Numeric column accessor, `None` if absent or not numeric.
    pub fn reals(&self, name: &str) -> Option<&[f64]> {
        match self.column(name) {
            Some(ColumnData::Reals(v)) => Some(v),
            _ => None,
        }
    }

    /// Timestamp column accessor, `None` if absent or not timestamps.
    pub fn epochs(&self, name: &str) -> Option<&[Epoch]> {
        match self.column(name) {
            Some(ColumnData::Epochs(v)) => Some(v),
            _ => None,
        }
    }

    /// Writes the table as CSV, timestamps in their hifitime representation.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let mut wtr = csv::Writer::from_path(path.as_ref()).context(CsvWriteSnafu)?;
        wtr.write_record(self.names()).context(CsvWriteSnafu)?;
        for row in 0..self.rows {
            wtr.write_record(self.columns.iter().map(|c| c.fmt_value(row)))
                .context(CsvWriteSnafu)?;
        }
        wtr.flush()
            .map_err(csv::Error::from)
            .context(CsvWriteSnafu)?;
        info!("saved {} to {}", self, path.as_ref().display());
        Ok(())
    }
}

impl fmt::Display for SeriesTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SeriesTable of {} rows x [{}]",
            self.rows,
            self.names().join(", ")
        )
    }
}

#[cfg(test)]
mod ut_series {
    use super::*;

    #[test]
    fn ragged_columns_rejected() {
        let names = vec!["x".to_string(), "y".to_string()];
        let data = vec![
            ColumnData::Reals(vec![1.0, 2.0]),
            ColumnData::Reals(vec![1.0]),
        ];
        assert!(matches!(
            SeriesTable::assemble(&names, data),
            Err(ExtractionError::RaggedColumns { .. })
        ));
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let names = vec!["Time".to_string()];
        let data = vec![ColumnData::Epochs(vec![Epoch::from_gregorian_utc_at_midnight(
            2016, 6, 10,
        )])];
        let table = SeriesTable::assemble(&names, data).unwrap();
        assert!(table.epochs("time").is_some());
        assert!(table.reals("time").is_none());
        assert_eq!(table.len(), 1);
    }
}
