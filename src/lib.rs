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

//! Similarity metrics over sparse preferences and dense rows, collaborative filtering on top
//! of them, and three ways of grouping rows: a merge tree, k-means and a 2D projection.
//!
//! All engines are synchronous, read their inputs without mutating them and return freshly
//! built results.

#[macro_use]
extern crate serde_derive;

pub mod error;
pub mod types;
pub mod similarity;
pub mod recommend;
pub mod dataset;
pub mod hierarchy;
pub mod kmeans;
pub mod mds;
pub mod outline;
pub mod io;

mod usage_tests;

pub use dataset::Dataset;
pub use error::{Error, KeyKind, Result};
pub use hierarchy::{hierarchical_cluster, ClusterNode, NodeId};
pub use kmeans::{KMeans, Partition};
pub use mds::{Mds, Projection};
pub use recommend::{
    calculate_similar_items, get_recommendations, get_recommended_items, top_matches,
    transform_preferences,
};
pub use similarity::{
    pearson_distance, Distance, EuclideanDistance, PearsonDistance, Similarity, SimilarityMetric,
};
pub use types::{ItemSimilarityIndex, Preferences, RankedList, Ratings, ScoredItem};
