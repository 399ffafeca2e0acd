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

use std::fmt;
use std::io;

use thiserror::Error;

/// Which key space a missing name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Entity,
    Item,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyKind::Entity => write!(f, "entity"),
            KeyKind::Item => write!(f, "item"),
        }
    }
}

/// Errors surfaced by the recommendation and clustering engines and the file adapters.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller referenced an entity or item that is absent from the preferences.
    #[error("unknown {kind}: {name}")]
    UnknownKey { kind: KeyKind, name: String },

    /// A dense engine received no rows, or rows without columns.
    #[error("empty input")]
    EmptyInput,

    /// Rows of a dense dataset differ in length.
    #[error("dimension mismatch in row {row}: expected {expected}, found {found}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        name: &'static str,
        message: &'static str,
    },

    #[error("malformed input on line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unknown_entity(name: &str) -> Self {
        Error::UnknownKey { kind: KeyKind::Entity, name: name.to_owned() }
    }

    pub(crate) fn unknown_item(name: &str) -> Self {
        Error::UnknownKey { kind: KeyKind::Item, name: name.to_owned() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
