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

use std::env;
use std::error::Error;
use std::process;

use getopts::Options;
use tracing::info;
use tracing_subscriber::EnvFilter;

use affinity::io;
use affinity::recommend;
use affinity::SimilarityMetric;

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input consists of ratings \
        that entities gave to items. The input file must contain an entity, an item and a \
        numeric rating per line, separated by tabs.", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("e", "entity", "Entity to recommend for (optional, recommends for every entity \
        by default).", "NAME");
    opts.optopt("n", "num-recommendations", "Number of recommendations per entity (optional, \
        defaults to 10).", "NUMBER");
    opts.optopt("m", "metric", "Similarity metric, one of euclidean, pearson, tanimoto, cosine \
        (optional, defaults to pearson).", "METRIC");
    opts.optflag("", "item-based", "Recommend from precomputed item neighbourhoods instead of \
        similar entities.");
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

    let ratings_path = match matches.opt_str("i") {
        Some(path) => path,
        None => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        ),
    };

    let n: usize = match matches.opt_get_default("n", 10) {
        Ok(n) => n,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let metric: SimilarityMetric = match matches.opt_get_default("m", SimilarityMetric::Pearson) {
        Ok(metric) => metric,
        Err(failure) => {
            let hint = format!("Problem with option 'm': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    init_logging(matches.opt_count("v"));

    let result = compute_recommendations(
        &ratings_path,
        matches.opt_str("e"),
        n,
        metric,
        matches.opt_present("item-based"),
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

fn compute_recommendations(
    ratings_path: &str,
    entity: Option<String>,
    n: usize,
    metric: SimilarityMetric,
    item_based: bool,
    output_path: Option<String>,
) -> Result<(), Box<dyn Error>> {

    info!(path = ratings_path, "reading ratings");
    let preferences = io::read_preferences(ratings_path)?;

    info!(num_entities = preferences.len(), ?metric, item_based, "computing recommendations");

    let mut entities: Vec<String> = match entity {
        Some(entity) => vec![entity],
        None => preferences.keys().cloned().collect(),
    };
    entities.sort();

    let index = if item_based {
        Some(recommend::calculate_similar_items(&preferences, n, &metric)?)
    } else {
        None
    };

    let mut out = io::output(output_path)?;

    for entity in entities.iter() {

        let mut ranked = match index {
            Some(ref index) => recommend::get_recommended_items(&preferences, index, entity)?,
            None => recommend::get_recommendations(&preferences, entity, &metric)?,
        };
        ranked.truncate(n);

        io::write_ranked(&mut out, entity, &ranked)?;
    }

    Ok(())
}
