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

//! Multidimensional scaling down to two dimensions.
//!
//! Points start at random positions in the unit square. Each round compares the projected
//! distance of every pair with its true distance and moves every point towards or away from
//! each partner in proportion to the relative error. The rounds stop once the total error
//! grows again, and the positions from before that regression are returned.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::dataset;
use crate::error::{Error, Result};
use crate::similarity::Distance;

const DEFAULT_LEARNING_RATE: f64 = 0.01;
const DEFAULT_MAX_ITER: usize = 1000;

/// Floor for distances we divide by. Coinciding points or identical rows would otherwise
/// produce infinite gradients.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Mds {
    learning_rate: f64,
    max_iter: usize,
    seed: Option<u64>,
}

/// Two-dimensional coordinates, one point per input row, plus the total error of these
/// positions and the number of rounds that were run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub points: Vec<[f64; 2]>,
    pub iterations: usize,
    pub error: f64,
}

impl Default for Mds {
    fn default() -> Self {
        Mds::new()
    }
}

impl Mds {

    pub fn new() -> Self {
        Mds { learning_rate: DEFAULT_LEARNING_RATE, max_iter: DEFAULT_MAX_ITER, seed: None }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn project<D>(&self, rows: &[Vec<f64>], distance: &D) -> Result<Projection>
        where D: Distance + ?Sized {

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "learning_rate",
                message: "must be a positive number",
            });
        }

        dataset::check_rows(rows)?;

        let n = rows.len();

        let true_distances: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| distance.distance(&rows[i], &rows[j])).collect())
            .collect();

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut locations: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen(), rng.gen()]).collect();

        let mut last_error: Option<f64> = None;
        let mut previous_locations = locations.clone();
        let mut iterations = 0;

        while iterations < self.max_iter {

            iterations += 1;

            let projected = projected_distances(&locations);

            let mut gradient = vec![[0.0_f64; 2]; n];
            let mut total_error = 0.0;

            for k in 0..n {
                for j in 0..n {

                    if j == k {
                        continue;
                    }

                    let error_term = relative_error(projected[j][k], true_distances[j][k]);
                    let pull = projected[j][k].max(EPSILON);

                    gradient[k][0] += ((locations[k][0] - locations[j][0]) / pull) * error_term;
                    gradient[k][1] += ((locations[k][1] - locations[j][1]) / pull) * error_term;

                    total_error += error_term.abs();
                }
            }

            debug!(iteration = iterations, total_error, "projected distances");

            // Moving the points made things worse, keep the positions from before the move
            if let Some(error) = last_error {
                if error < total_error {
                    info!(iterations, error, "projection stopped improving");
                    return Ok(Projection { points: previous_locations, iterations, error });
                }
            }

            last_error = Some(total_error);
            previous_locations.copy_from_slice(&locations);

            for (location, step) in locations.iter_mut().zip(gradient.iter()) {
                location[0] -= self.learning_rate * step[0];
                location[1] -= self.learning_rate * step[1];
            }
        }

        // The cap was hit, the last move has not been scored yet
        let error = stress(&projected_distances(&locations), &true_distances);

        info!(iterations, error, "projection hit the round cap");

        match last_error {
            Some(last_error) if last_error < error => {
                Ok(Projection { points: previous_locations, iterations, error: last_error })
            }
            _ => Ok(Projection { points: locations, iterations, error }),
        }
    }
}

/// Error relative to the true distance. Pairs of identical rows have nothing to be relative
/// to, so they contribute their absolute error.
fn relative_error(projected: f64, target: f64) -> f64 {
    if target < EPSILON {
        projected - target
    } else {
        (projected - target) / target
    }
}

fn projected_distances(locations: &[[f64; 2]]) -> Vec<Vec<f64>> {
    locations.iter()
        .map(|a| {
            locations.iter()
                .map(|b| ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt())
                .collect()
        })
        .collect()
}

fn stress(projected: &[Vec<f64>], true_distances: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;

    for (k, row) in projected.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            if j != k {
                total += relative_error(*value, true_distances[j][k]).abs();
            }
        }
    }

    total
}
