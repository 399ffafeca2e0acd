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

//! Similarity scores between entities of a preference map, and distances between dense rows.
//!
//! The sparse metrics only look at items both entities rated. Entities without any common
//! item have similarity 0, which the recommenders treat as neutral and skip. The dense
//! Pearson distance instead maps degenerate, variance-free rows to 1, i.e. maximally
//! dissimilar, so that clustering never merges them eagerly.

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{Preferences, Ratings};

/// Scores how alike two entities of a preference map are. Higher means more alike.
pub trait Similarity {
    fn score(&self, preferences: &Preferences, a: &str, b: &str) -> Result<f64>;
}

/// The built-in similarity metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    Euclidean,
    Pearson,
    Tanimoto,
    Cosine,
}

impl Default for SimilarityMetric {
    fn default() -> Self {
        SimilarityMetric::Pearson
    }
}

impl SimilarityMetric {
    /// Scores two rating maps directly, without a lookup in a preference map.
    pub fn between(&self, ratings_a: &Ratings, ratings_b: &Ratings) -> f64 {
        match self {
            SimilarityMetric::Euclidean => euclidean(ratings_a, ratings_b),
            SimilarityMetric::Pearson => pearson(ratings_a, ratings_b),
            SimilarityMetric::Tanimoto => tanimoto(ratings_a, ratings_b),
            SimilarityMetric::Cosine => cosine(ratings_a, ratings_b),
        }
    }
}

impl Similarity for SimilarityMetric {
    fn score(&self, preferences: &Preferences, a: &str, b: &str) -> Result<f64> {
        let (ratings_a, ratings_b) = lookup(preferences, a, b)?;
        Ok(self.between(ratings_a, ratings_b))
    }
}

impl FromStr for SimilarityMetric {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "euclidean" | "distance" => Ok(SimilarityMetric::Euclidean),
            "pearson" => Ok(SimilarityMetric::Pearson),
            "tanimoto" | "jaccard" => Ok(SimilarityMetric::Tanimoto),
            "cosine" => Ok(SimilarityMetric::Cosine),
            _ => Err(Error::InvalidParameter {
                name: "metric",
                message: "expected one of euclidean, pearson, tanimoto, cosine",
            }),
        }
    }
}

fn lookup<'a>(
    preferences: &'a Preferences,
    a: &str,
    b: &str,
) -> Result<(&'a Ratings, &'a Ratings)> {

    let ratings_a = preferences.get(a).ok_or_else(|| Error::unknown_entity(a))?;
    let ratings_b = preferences.get(b).ok_or_else(|| Error::unknown_entity(b))?;

    Ok((ratings_a, ratings_b))
}

/// Items rated by both, in a fixed order so that every sum below is accumulated identically
/// no matter which argument comes first.
fn common_items<'a>(ratings_a: &'a Ratings, ratings_b: &Ratings) -> Vec<&'a str> {
    let mut common: Vec<&str> = ratings_a.keys()
        .filter(|item| ratings_b.contains_key(*item))
        .map(|item| item.as_str())
        .collect();

    common.sort_unstable();
    common
}

pub fn euclidean_similarity(preferences: &Preferences, a: &str, b: &str) -> Result<f64> {
    SimilarityMetric::Euclidean.score(preferences, a, b)
}

pub fn pearson_similarity(preferences: &Preferences, a: &str, b: &str) -> Result<f64> {
    SimilarityMetric::Pearson.score(preferences, a, b)
}

pub fn tanimoto_similarity(preferences: &Preferences, a: &str, b: &str) -> Result<f64> {
    SimilarityMetric::Tanimoto.score(preferences, a, b)
}

pub fn cosine_similarity(preferences: &Preferences, a: &str, b: &str) -> Result<f64> {
    SimilarityMetric::Cosine.score(preferences, a, b)
}

/// `1 / (1 + d)` where `d` is the Euclidean distance over the common items, in (0, 1].
pub fn euclidean(ratings_a: &Ratings, ratings_b: &Ratings) -> f64 {

    let common = common_items(ratings_a, ratings_b);

    if common.is_empty() {
        return 0.0;
    }

    let sum_of_squares: f64 = common.iter()
        .map(|item| (ratings_a[*item] - ratings_b[*item]).powi(2))
        .sum();

    1.0 / (1.0 + sum_of_squares.sqrt())
}

/// Pearson correlation over the common items. Corrects for raters who are consistently
/// harsher or more generous than others.
pub fn pearson(ratings_a: &Ratings, ratings_b: &Ratings) -> f64 {

    let common = common_items(ratings_a, ratings_b);

    if common.is_empty() {
        return 0.0;
    }

    let n = common.len() as f64;

    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    let mut sum_a_squared = 0.0;
    let mut sum_b_squared = 0.0;
    let mut sum_of_products = 0.0;

    for item in common.iter() {
        let rating_a = ratings_a[*item];
        let rating_b = ratings_b[*item];

        sum_a += rating_a;
        sum_b += rating_b;
        sum_a_squared += rating_a * rating_a;
        sum_b_squared += rating_b * rating_b;
        sum_of_products += rating_a * rating_b;
    }

    let numerator = sum_of_products - (sum_a * sum_b / n);
    let denominator = ((sum_a_squared - sum_a * sum_a / n) *
        (sum_b_squared - sum_b * sum_b / n)).sqrt();

    // No variance on either side, round off can also leave a negative radicand
    if denominator.is_nan() || denominator == 0.0 {
        return 0.0;
    }

    numerator / denominator
}

/// Size of the intersection over the size of the union of both item sets.
pub fn tanimoto(ratings_a: &Ratings, ratings_b: &Ratings) -> f64 {

    let shared = ratings_a.keys()
        .filter(|item| ratings_b.contains_key(*item))
        .count();

    if shared == 0 {
        return 0.0;
    }

    let union = ratings_a.len() + ratings_b.len() - shared;

    shared as f64 / union as f64
}

/// Cosine of the angle between the two rating vectors restricted to the common items,
/// rounded to three decimals.
pub fn cosine(ratings_a: &Ratings, ratings_b: &Ratings) -> f64 {

    let common = common_items(ratings_a, ratings_b);

    if common.is_empty() {
        return 0.0;
    }

    let vector_a: Vec<f64> = common.iter().map(|item| ratings_a[*item]).collect();
    let vector_b: Vec<f64> = common.iter().map(|item| ratings_b[*item]).collect();

    let dot: f64 = vector_a.iter().zip(vector_b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = vector_a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = vector_b.iter().map(|y| y * y).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b) * 1000.0).round() / 1000.0
}

/// Distance between two index-aligned dense rows. 0 means identical, larger is further apart.
pub trait Distance {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;
}

impl<F> Distance for F where F: Fn(&[f64], &[f64]) -> f64 {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        self(a, b)
    }
}

/// `1 - r` for the Pearson correlation `r` of two rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonDistance;

impl Distance for PearsonDistance {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        pearson_distance(a, b)
    }
}

/// Plain Euclidean distance between two rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl Distance for EuclideanDistance {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Pearson distance between two dense rows. Rows without variance get distance 1.
pub fn pearson_distance(v1: &[f64], v2: &[f64]) -> f64 {
    debug_assert_eq!(v1.len(), v2.len());

    let n = v1.len().min(v2.len());

    if n == 0 {
        return 1.0;
    }

    let mut sum_1 = 0.0;
    let mut sum_2 = 0.0;
    let mut sum_1_squared = 0.0;
    let mut sum_2_squared = 0.0;
    let mut sum_of_products = 0.0;

    for (x, y) in v1.iter().zip(v2.iter()) {
        sum_1 += x;
        sum_2 += y;
        sum_1_squared += x * x;
        sum_2_squared += y * y;
        sum_of_products += x * y;
    }

    let n = n as f64;

    let numerator = sum_of_products - (sum_1 * sum_2 / n);
    let denominator = ((sum_1_squared - sum_1 * sum_1 / n) *
        (sum_2_squared - sum_2 * sum_2 / n)).sqrt();

    if denominator.is_nan() || denominator == 0.0 {
        return 1.0;
    }

    1.0 - numerator / denominator
}

#[cfg(test)]
mod tests {

    use crate::types::{preferences_from, Preferences};

    use super::*;

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 0.0001
    }

    fn small_panel() -> Preferences {
        preferences_from(vec![
            ("A", "x", 5.0), ("A", "y", 3.0),
            ("B", "x", 4.0), ("B", "y", 3.0),
            ("C", "x", 1.0), ("C", "y", 5.0), ("C", "z", 2.0),
            ("D", "w", 4.0),
        ])
    }

    #[test]
    fn euclidean_on_common_items() {
        let preferences = small_panel();

        assert!(close_enough_to(euclidean_similarity(&preferences, "A", "B").unwrap(), 0.5));
        assert!(close_enough_to(euclidean_similarity(&preferences, "A", "A").unwrap(), 1.0));
        assert_eq!(euclidean_similarity(&preferences, "A", "D").unwrap(), 0.0);
    }

    #[test]
    fn pearson_on_common_items() {
        let preferences = small_panel();

        // Two points always lie on a line
        assert!(close_enough_to(pearson_similarity(&preferences, "A", "C").unwrap(), -1.0));
        assert!(close_enough_to(pearson_similarity(&preferences, "A", "B").unwrap(), 1.0));
        assert_eq!(pearson_similarity(&preferences, "A", "D").unwrap(), 0.0);
    }

    #[test]
    fn pearson_without_variance_is_zero() {
        let preferences = preferences_from(vec![
            ("A", "x", 3.0), ("A", "y", 3.0),
            ("B", "x", 1.0), ("B", "y", 5.0),
        ]);

        assert_eq!(pearson_similarity(&preferences, "A", "B").unwrap(), 0.0);
    }

    #[test]
    fn tanimoto_is_overlap_over_union() {
        let preferences = small_panel();

        assert!(close_enough_to(tanimoto_similarity(&preferences, "A", "C").unwrap(), 2.0 / 3.0));
        assert!(close_enough_to(tanimoto_similarity(&preferences, "A", "B").unwrap(), 1.0));
        assert_eq!(tanimoto_similarity(&preferences, "C", "D").unwrap(), 0.0);
    }

    #[test]
    fn cosine_is_rounded() {
        let preferences = small_panel();

        // 29 / (sqrt(34) * 5)
        assert_eq!(cosine_similarity(&preferences, "A", "B").unwrap(), 0.995);
        assert_eq!(cosine_similarity(&preferences, "A", "A").unwrap(), 1.0);
        assert_eq!(cosine_similarity(&preferences, "B", "D").unwrap(), 0.0);
    }

    #[test]
    fn unknown_entities_fail() {
        let preferences = small_panel();

        for metric in &[
            SimilarityMetric::Euclidean,
            SimilarityMetric::Pearson,
            SimilarityMetric::Tanimoto,
            SimilarityMetric::Cosine,
        ] {
            match metric.score(&preferences, "A", "nobody") {
                Err(Error::UnknownKey { name, .. }) => assert_eq!(name, "nobody"),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn metrics_parse_from_names() {
        assert_eq!("Pearson".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::Pearson);
        assert_eq!("jaccard".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::Tanimoto);
        assert!("manhattan".parse::<SimilarityMetric>().is_err());
    }

    #[test]
    fn pearson_distance_of_identical_rows() {
        let v = [1.0, 4.0, 2.0, 8.0];
        assert!(pearson_distance(&v, &v).abs() < 1e-12);

        let w = [2.0, 8.0, 4.0, 16.0];
        assert!(pearson_distance(&v, &w).abs() < 1e-12);
    }

    #[test]
    fn pearson_distance_of_constant_rows_is_one() {
        assert_eq!(pearson_distance(&[2.0, 2.0, 2.0], &[5.0, 5.0, 5.0]), 1.0);
        assert_eq!(pearson_distance(&[2.0, 2.0, 2.0], &[1.0, 3.0, 5.0]), 1.0);
    }

    #[test]
    fn pearson_distance_of_anticorrelated_rows_is_two() {
        assert!(close_enough_to(pearson_distance(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), 2.0));
    }

    #[test]
    fn closures_are_distances() {
        let manhattan = |a: &[f64], b: &[f64]| -> f64 {
            a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
        };

        assert!(close_enough_to(manhattan.distance(&[0.0, 0.0], &[1.0, 2.0]), 3.0));
        assert!(close_enough_to(EuclideanDistance.distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0));
    }
}
