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

#[macro_use]
extern crate serde_derive;

use std::env;
use std::error::Error;
use std::io::Write;
use std::process;

use getopts::Options;
use tracing::info;
use tracing_subscriber::EnvFilter;

use affinity::io;
use affinity::outline::outline;
use affinity::{hierarchical_cluster, KMeans, Mds, PearsonDistance};

/// Struct used for JSON serialization of a k-means partition with the original row names.
#[derive(Serialize)]
struct LabelledPartition<'a> {
    clusters: Vec<Vec<&'a str>>,
    iterations: usize,
    converged: bool,
}

/// Struct used for JSON serialization of a single projected point.
#[derive(Serialize)]
struct LabelledPoint<'a> {
    label: &'a str,
    x: f64,
    y: f64,
}

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The first line holds the column \
        names, every further line a row name followed by tab separated values.", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("a", "algorithm", "One of hierarchical, kmeans, mds (optional, defaults to \
        hierarchical).", "NAME");
    opts.optopt("k", "num-clusters", "Number of clusters for kmeans (optional, defaults to 4).",
        "NUMBER");
    opts.optopt("s", "seed", "Random seed for kmeans and mds (optional).", "NUMBER");
    opts.optflag("c", "columns", "Cluster the columns instead of the rows.");
    opts.optflagmulti("v", "verbose", "Log progress to stderr, repeat for more detail.");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let data_path = match matches.opt_str("i") {
        Some(path) => path,
        None => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        ),
    };

    let algorithm = matches.opt_str("a").unwrap_or_else(|| String::from("hierarchical"));

    if !["hierarchical", "kmeans", "mds"].contains(&algorithm.as_str()) {
        let hint = format!("Unknown algorithm '{}'.", algorithm);
        return print_usage_and_exit(&program, opts, Some(&hint));
    }

    let k: usize = match matches.opt_get_default("k", 4) {
        Ok(k) => k,
        Err(failure) => {
            let hint = format!("Problem with option 'k': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let seed: Option<u64> = match matches.opt_get("s") {
        Ok(seed) => seed,
        Err(failure) => {
            let hint = format!("Problem with option 's': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    init_logging(matches.opt_count("v"));

    let result = cluster(
        &data_path,
        &algorithm,
        k,
        seed,
        matches.opt_present("c"),
        matches.opt_str("o"),
    );

    if let Err(failure) = result {
        eprintln!("{}", failure);
        process::exit(1);
    }
}

fn init_logging(verbosity: usize) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));
}

fn cluster(
    data_path: &str,
    algorithm: &str,
    k: usize,
    seed: Option<u64>,
    columns: bool,
    output_path: Option<String>,
) -> Result<(), Box<dyn Error>> {

    info!(path = data_path, "reading matrix");
    let mut dataset = io::read_matrix(data_path)?;

    if columns {
        dataset = dataset.transpose();
    }

    info!(
        num_rows = dataset.num_rows(),
        num_columns = dataset.num_columns(),
        algorithm,
        "clustering"
    );

    let mut out = io::output(output_path)?;
    let labels = &dataset.row_names;

    match algorithm {
        "kmeans" => {
            let mut kmeans = KMeans::new(k);
            if let Some(seed) = seed {
                kmeans = kmeans.with_seed(seed);
            }

            let partition = kmeans.cluster(&dataset.data, &PearsonDistance)?;

            let labelled = LabelledPartition {
                clusters: partition.clusters.iter()
                    .map(|members| members.iter().map(|row| labels[*row].as_str()).collect())
                    .collect(),
                iterations: partition.iterations,
                converged: partition.converged,
            };

            io::write_json(&mut out, &labelled)?;
        },
        "mds" => {
            let mut mds = Mds::new();
            if let Some(seed) = seed {
                mds = mds.with_seed(seed);
            }

            let projection = mds.project(&dataset.data, &PearsonDistance)?;

            for (label, point) in labels.iter().zip(projection.points.iter()) {
                let labelled = LabelledPoint { label: label.as_str(), x: point[0], y: point[1] };
                io::write_json(&mut out, &labelled)?;
            }
        },
        _ => {
            let tree = hierarchical_cluster(&dataset.data, &PearsonDistance)?;
            write!(out, "{}", outline(&tree, Some(labels.as_slice())))?;
        },
    }

    Ok(())
}
