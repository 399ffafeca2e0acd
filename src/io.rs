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

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types;
use crate::types::{Preferences, ScoredItem};

/// Tab separated input without headers. Headers, where a format has them, are read as the
/// first record. Records may differ in length, the readers check field counts themselves.
pub fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b'\t')
        .from_reader(reader)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

fn parse_value(value: &str, line: u64) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| Error::Parse {
        line,
        message: format!("not a number: '{}'", value),
    })
}

/// Reads a matrix file: the first line holds a corner cell followed by the column labels,
/// every following line a row label followed by one value per column. This is the layout
/// of word count files, with one blog per row and one word per column.
pub fn read_matrix(path: &str) -> Result<Dataset> {
    read_matrix_from(File::open(Path::new(path))?)
}

pub fn read_matrix_from<R: Read>(reader: R) -> Result<Dataset> {

    let mut csv_reader = csv_reader(reader);
    let mut records = csv_reader.records();

    let header = match records.next() {
        Some(header) => header?,
        None => return Err(Error::EmptyInput),
    };

    let column_names: Vec<String> = header.iter().skip(1).map(String::from).collect();

    let mut row_names = Vec::new();
    let mut data = Vec::new();

    for record in records {
        let record = record?;
        let line = line_of(&record);

        let mut fields = record.iter();
        let row_name = match fields.next() {
            Some(name) => name.to_owned(),
            None => continue,
        };

        let values = fields
            .map(|value| parse_value(value, line))
            .collect::<Result<Vec<f64>>>()?;

        row_names.push(row_name);
        data.push(values);
    }

    Dataset::new(row_names, column_names, data)
}

/// Reads `entity \t item \t rating` triples into preferences.
pub fn read_preferences(path: &str) -> Result<Preferences> {
    read_preferences_from(File::open(Path::new(path))?)
}

pub fn read_preferences_from<R: Read>(reader: R) -> Result<Preferences> {

    let mut csv_reader = csv_reader(reader);
    let mut triples = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = line_of(&record);

        if record.len() != 3 {
            return Err(Error::Parse {
                line,
                message: format!("expected entity, item and rating, found {} fields", record.len()),
            });
        }

        let rating = parse_value(&record[2], line)?;
        triples.push((record[0].to_owned(), record[1].to_owned(), rating));
    }

    Ok(types::preferences_from(triples))
}

/// Writes to the file at `path` if one is given, to stdout otherwise.
pub fn output(path: Option<String>) -> io::Result<Box<dyn Write>> {
    let out: Box<dyn Write> = match path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    Ok(out)
}

/// Struct used for JSON serialization of a ranked list. Field names will be used in JSON.
#[derive(Serialize)]
struct Ranking<'a> {
    for_entity: &'a str,
    ranked: &'a [ScoredItem],
}

/// Outputs one ranked list as a single line of JSON.
pub fn write_ranked<W: Write + ?Sized>(
    out: &mut W,
    for_entity: &str,
    ranked: &[ScoredItem],
) -> Result<()> {

    let ranking_as_json = serde_json::to_string(&Ranking { for_entity, ranked })?;
    writeln!(out, "{}", ranking_as_json)?;

    Ok(())
}

/// Outputs any serializable result, e.g. a partition or a projection, as a single line of JSON.
pub fn write_json<W: Write + ?Sized, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn matrix_with_labels() {
        let input = "Blog\tchina\tkids\tmusic\n\
                     Signum sine tinnitu\t0\t1\t0\n\
                     Boing Boing\t10\t4\t12\n";

        let dataset = read_matrix_from(input.as_bytes()).unwrap();

        assert_eq!(dataset.column_names, vec!["china", "kids", "music"]);
        assert_eq!(dataset.row_names, vec!["Signum sine tinnitu", "Boing Boing"]);
        assert_eq!(dataset.data, vec![vec![0.0, 1.0, 0.0], vec![10.0, 4.0, 12.0]]);
    }

    #[test]
    fn matrix_with_garbage_values() {
        let input = "Blog\tchina\nBoing Boing\tmany\n";

        match read_matrix_from(input.as_bytes()) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn matrix_with_ragged_rows() {
        let input = "Blog\tchina\tkids\n\
                     Boing Boing\t10\t4\n\
                     Signum sine tinnitu\t0\n";

        match read_matrix_from(input.as_bytes()) {
            Err(Error::DimensionMismatch { row, expected, found }) => {
                assert_eq!((row, expected, found), (1, 2, 1));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn empty_matrix() {
        assert!(matches!(read_matrix_from("".as_bytes()), Err(Error::EmptyInput)));
    }

    #[test]
    fn preference_triples() {
        let input = "alice\tapple\t4.5\nalice\tpony\t1\nbob\tapple\t3\n";

        let preferences = read_preferences_from(input.as_bytes()).unwrap();

        assert_eq!(preferences.len(), 2);
        assert_eq!(preferences["alice"]["apple"], 4.5);
        assert_eq!(preferences["bob"]["apple"], 3.0);
    }

    #[test]
    fn preference_triples_need_three_fields() {
        let input = "alice\tapple\n";
        assert!(matches!(read_preferences_from(input.as_bytes()), Err(Error::Parse { .. })));
    }

    #[test]
    fn ranked_list_as_json() {
        let mut out: Vec<u8> = Vec::new();
        let ranked = vec![ScoredItem::new("pony", 2.5), ScoredItem::new("dog", 1.0)];

        write_ranked(&mut out, "alice", &ranked).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert_eq!(
            written,
            "{\"for_entity\":\"alice\",\"ranked\":[{\"item\":\"pony\",\"score\":2.5},\
             {\"item\":\"dog\",\"score\":1.0}]}\n"
        );
    }
}
