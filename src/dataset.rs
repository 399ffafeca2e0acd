/*
 * Affinity
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use crate::error::{Error, Result};

/// Labelled, rectangular numeric data, e.g. word counts per blog. Rows are the entities to
/// cluster, columns their features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub row_names: Vec<String>,
    pub column_names: Vec<String>,
    pub data: Vec<Vec<f64>>,
}

impl Dataset {

    /// Builds a dataset and checks that labels and values line up.
    pub fn new(
        row_names: Vec<String>,
        column_names: Vec<String>,
        data: Vec<Vec<f64>>,
    ) -> Result<Self> {

        let num_columns = check_rows(&data)?;

        if row_names.len() != data.len() {
            return Err(Error::DimensionMismatch {
                row: row_names.len().min(data.len()),
                expected: data.len(),
                found: row_names.len(),
            });
        }

        if column_names.len() != num_columns {
            return Err(Error::DimensionMismatch {
                row: 0,
                expected: num_columns,
                found: column_names.len(),
            });
        }

        Ok(Dataset { row_names, column_names, data })
    }

    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    pub fn num_columns(&self) -> usize {
        self.column_names.len()
    }

    /// Swaps rows and columns, so that the features can be clustered instead of the entities.
    pub fn transpose(&self) -> Dataset {
        Dataset {
            row_names: self.column_names.clone(),
            column_names: self.row_names.clone(),
            data: transpose(&self.data),
        }
    }
}

/// Checks that there is at least one row, that rows are not empty and that all rows have
/// the same length. Returns that length.
pub fn check_rows(rows: &[Vec<f64>]) -> Result<usize> {

    let expected = match rows.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => return Err(Error::EmptyInput),
    };

    for (row, values) in rows.iter().enumerate() {
        if values.len() != expected {
            return Err(Error::DimensionMismatch { row, expected, found: values.len() });
        }
    }

    Ok(expected)
}

/// Column-major copy of row-major data. Expects rectangular input.
pub fn transpose(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {

    let num_columns = rows.first().map_or(0, |row| row.len());

    (0..num_columns)
        .map(|column| rows.iter().map(|row| row[column]).collect())
        .collect()
}
