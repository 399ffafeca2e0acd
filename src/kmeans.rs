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

//! K-means clustering with centroids placed uniformly at random inside the bounding box of
//! the data. Each round assigns every row to its nearest centroid and moves each centroid to
//! the mean of its rows, until the assignment stops changing or the round cap is hit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::dataset;
use crate::error::{Error, Result};
use crate::similarity::Distance;

const DEFAULT_MAX_ITER: usize = 100;

#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    max_iter: usize,
    seed: Option<u64>,
}

/// Row indices per cluster. `converged` is false when the round cap was hit while the
/// assignment was still changing; the last assignment is returned regardless.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub clusters: Vec<Vec<usize>>,
    pub iterations: usize,
    pub converged: bool,
}

impl KMeans {

    pub fn new(k: usize) -> Self {
        KMeans { k, max_iter: DEFAULT_MAX_ITER, seed: None }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fixes the random centroid placement, without a seed it is drawn from OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn cluster<D>(&self, rows: &[Vec<f64>], distance: &D) -> Result<Partition>
        where D: Distance + ?Sized {

        self.fit(rows, distance).map(|(partition, _)| partition)
    }

    /// Runs the rounds and also hands back the centroids of the final assignment.
    pub(crate) fn fit<D>(
        &self,
        rows: &[Vec<f64>],
        distance: &D,
    ) -> Result<(Partition, Vec<Vec<f64>>)> where D: Distance + ?Sized {

        if self.k == 0 {
            return Err(Error::InvalidParameter { name: "k", message: "must be at least 1" });
        }

        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }

        let num_columns = dataset::check_rows(rows)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let ranges: Vec<(f64, f64)> = (0..num_columns)
            .map(|column| {
                rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), row| {
                    (min.min(row[column]), max.max(row[column]))
                })
            })
            .collect();

        let mut centroids: Vec<Vec<f64>> = (0..self.k)
            .map(|_| {
                ranges.iter()
                    .map(|(min, max)| rng.gen::<f64>() * (max - min) + min)
                    .collect()
            })
            .collect();

        let mut last_matches: Option<Vec<Vec<usize>>> = None;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {

            iterations += 1;

            let best_matches = assign(rows, &centroids, distance);

            debug!(
                iteration = iterations,
                sizes = ?best_matches.iter().map(|m| m.len()).collect::<Vec<_>>(),
                "assigned rows to centroids"
            );

            if last_matches.as_ref() == Some(&best_matches) {
                converged = true;
                break;
            }

            for (centroid, members) in centroids.iter_mut().zip(best_matches.iter()) {
                // Empty clusters keep their previous position
                if !members.is_empty() {
                    *centroid = mean(rows, members, num_columns);
                }
            }

            last_matches = Some(best_matches);
        }

        info!(k = self.k, iterations, converged, "k-means finished");

        let clusters = last_matches.unwrap_or_default();

        Ok((Partition { clusters, iterations, converged }, centroids))
    }
}

/// Assigns every row to its nearest centroid, earlier centroids win ties.
pub(crate) fn assign<D>(
    rows: &[Vec<f64>],
    centroids: &[Vec<f64>],
    distance: &D,
) -> Vec<Vec<usize>> where D: Distance + ?Sized {

    let mut matches: Vec<Vec<usize>> = vec![Vec::new(); centroids.len()];

    for (row_index, row) in rows.iter().enumerate() {

        let mut best_match = 0;
        let mut best_distance = f64::INFINITY;

        for (centroid_index, centroid) in centroids.iter().enumerate() {
            let d = distance.distance(centroid, row);
            if d < best_distance {
                best_match = centroid_index;
                best_distance = d;
            }
        }

        matches[best_match].push(row_index);
    }

    matches
}

fn mean(rows: &[Vec<f64>], members: &[usize], num_columns: usize) -> Vec<f64> {
    let mut averages = vec![0.0; num_columns];

    for member in members {
        for (average, value) in averages.iter_mut().zip(rows[*member].iter()) {
            *average += value;
        }
    }

    for average in averages.iter_mut() {
        *average /= members.len() as f64;
    }

    averages
}

#[cfg(test)]
mod tests {

    use crate::similarity::{EuclideanDistance, PearsonDistance};

    use super::*;

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.1], vec![0.2, 0.0], vec![0.1, 0.2],
            vec![9.8, 10.0], vec![10.1, 9.9], vec![10.0, 10.2],
        ]
    }

    fn assert_covers_every_row(partition: &Partition, num_rows: usize) {
        let mut seen: Vec<usize> = partition.clusters.iter().flatten().cloned().collect();
        seen.sort();
        assert_eq!(seen, (0..num_rows).collect::<Vec<_>>());
    }

    #[test]
    fn every_row_in_exactly_one_cluster() {
        let rows = two_blobs();

        for seed in 0..10 {
            let partition = KMeans::new(2).with_seed(seed).cluster(&rows, &EuclideanDistance)
                .unwrap();

            assert_eq!(partition.clusters.len(), 2);
            assert_covers_every_row(&partition, rows.len());
        }
    }

    #[test]
    fn converged_partition_is_stable() {
        let rows = two_blobs();

        for seed in 0..10 {
            let (partition, centroids) = KMeans::new(2).with_seed(seed)
                .fit(&rows, &EuclideanDistance)
                .unwrap();

            assert!(partition.converged);
            assert_eq!(assign(&rows, &centroids, &EuclideanDistance), partition.clusters);
        }
    }

    #[test]
    fn same_seed_same_partition() {
        let rows = two_blobs();
        let kmeans = KMeans::new(3).with_seed(7);

        assert_eq!(
            kmeans.cluster(&rows, &PearsonDistance).unwrap(),
            kmeans.cluster(&rows, &PearsonDistance).unwrap()
        );
    }

    #[test]
    fn round_cap_is_respected() {
        let rows = two_blobs();
        let partition = KMeans::new(2).with_seed(3).with_max_iter(1)
            .cluster(&rows, &EuclideanDistance)
            .unwrap();

        assert_eq!(partition.iterations, 1);
        assert!(!partition.converged);
        assert_covers_every_row(&partition, rows.len());
    }

    #[test]
    fn nearest_centroid_wins_and_first_wins_ties() {
        let rows = vec![vec![0.0], vec![5.0], vec![10.0]];
        let centroids = vec![vec![0.0], vec![10.0]];

        assert_eq!(assign(&rows, &centroids, &EuclideanDistance), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn invalid_parameters_and_rows_fail() {
        let rows = two_blobs();

        assert!(matches!(
            KMeans::new(0).cluster(&rows, &EuclideanDistance),
            Err(Error::InvalidParameter { name: "k", .. })
        ));

        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            KMeans::new(2).cluster(&ragged, &EuclideanDistance),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
