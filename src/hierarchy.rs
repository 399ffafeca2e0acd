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

//! Agglomerative clustering of dense rows into a binary tree.
//!
//! Every row starts out as its own cluster. Each round scans all pairs of current clusters,
//! merges the closest pair into a new branch whose vector is the average of both, and
//! repeats until a single root remains. Pairwise distances are memoized per pair of node
//! identities; identities are never reused within a run, so cached entries never go stale.
//!
//! The scan is O(k²) per round and O(k³) overall, which is fine for the tens to low hundreds
//! of rows this is meant for.

use fnv::FnvHashMap;
use tracing::{debug, info, trace};

use crate::dataset;
use crate::error::{Error, Result};
use crate::similarity::Distance;

/// Identity of a tree node. Leaves are addressed by their row index, branches by the order
/// in which they were merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeId {
    Row(usize),
    Merge(usize),
}

impl NodeId {
    /// Single integer encoding: rows keep their non-negative index, merges count down
    /// from -1.
    pub fn as_signed(&self) -> i64 {
        match *self {
            NodeId::Row(row) => row as i64,
            NodeId::Merge(merge) => -(merge as i64) - 1,
        }
    }
}

/// Node of the cluster tree. A branch exclusively owns its two children and nodes are never
/// mutated once the tree is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ClusterNode {
    Leaf {
        row: usize,
        vector: Vec<f64>,
    },
    Branch {
        merge: usize,
        left: Box<ClusterNode>,
        right: Box<ClusterNode>,
        distance: f64,
        vector: Vec<f64>,
    },
}

impl ClusterNode {

    pub fn id(&self) -> NodeId {
        match self {
            ClusterNode::Leaf { row, .. } => NodeId::Row(*row),
            ClusterNode::Branch { merge, .. } => NodeId::Merge(*merge),
        }
    }

    pub fn vector(&self) -> &[f64] {
        match self {
            ClusterNode::Leaf { vector, .. } => vector,
            ClusterNode::Branch { vector, .. } => vector,
        }
    }

    /// Distance at which the children were merged, 0 for leaves.
    pub fn distance(&self) -> f64 {
        match self {
            ClusterNode::Leaf { .. } => 0.0,
            ClusterNode::Branch { distance, .. } => *distance,
        }
    }

    pub fn is_leaf(&self) -> bool {
        match self {
            ClusterNode::Leaf { .. } => true,
            ClusterNode::Branch { .. } => false,
        }
    }

    pub fn children(&self) -> Option<(&ClusterNode, &ClusterNode)> {
        match self {
            ClusterNode::Leaf { .. } => None,
            ClusterNode::Branch { left, right, .. } => Some((left, right)),
        }
    }

    /// Pre-order traversal yielding each node with its depth below this node.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![(0, self)] }
    }

    /// Row indices of all leaves, left to right.
    pub fn leaves(&self) -> Vec<usize> {
        self.walk()
            .filter_map(|(_, node)| match node {
                ClusterNode::Leaf { row, .. } => Some(*row),
                ClusterNode::Branch { .. } => None,
            })
            .collect()
    }

    /// Number of leaves below this node, which is the height a dendrogram needs.
    pub fn leaf_count(&self) -> usize {
        self.walk().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Largest sum of merge distances on any path from this node down to a leaf, which is
    /// the width a dendrogram needs.
    pub fn depth(&self) -> f64 {
        let mut deepest = 0.0_f64;
        let mut stack = vec![(self, 0.0)];

        while let Some((node, so_far)) = stack.pop() {
            match node.children() {
                Some((left, right)) => {
                    let below = so_far + node.distance();
                    stack.push((right, below));
                    stack.push((left, below));
                }
                None => deepest = deepest.max(so_far),
            }
        }

        deepest
    }
}

/// Iterator behind [`ClusterNode::walk`], uses an explicit stack instead of recursion.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a ClusterNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a ClusterNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;

        if let Some((left, right)) = node.children() {
            self.stack.push((depth + 1, right));
            self.stack.push((depth + 1, left));
        }

        Some((depth, node))
    }
}

fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

fn average(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| (x + y) / 2.0).collect()
}

/// Clusters `rows` hierarchically and returns the root of the tree. A single row yields a
/// single leaf. Ties between equally close pairs go to the pair found first in scan order.
pub fn hierarchical_cluster<D>(rows: &[Vec<f64>], distance: &D) -> Result<ClusterNode>
    where D: Distance + ?Sized {

    dataset::check_rows(rows)?;

    let mut clusters: Vec<ClusterNode> = rows.iter()
        .enumerate()
        .map(|(row, vector)| ClusterNode::Leaf { row, vector: vector.clone() })
        .collect();

    let mut distances: FnvHashMap<(NodeId, NodeId), f64> =
        FnvHashMap::with_capacity_and_hasher(rows.len() * rows.len(), Default::default());

    let mut num_merges = 0;

    while clusters.len() > 1 {

        let mut lowest_pair: Option<(usize, usize, f64)> = None;

        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {

                let key = pair_key(clusters[i].id(), clusters[j].id());

                let d = match distances.get(&key) {
                    Some(d) => *d,
                    None => {
                        let d = distance.distance(clusters[i].vector(), clusters[j].vector());
                        trace!(?key, d, "computed distance");
                        distances.insert(key, d);
                        d
                    }
                };

                let is_closer = match lowest_pair {
                    Some((_, _, closest)) => d < closest,
                    None => true,
                };

                if is_closer {
                    lowest_pair = Some((i, j, d));
                }
            }
        }

        let (i, j, closest) = match lowest_pair {
            Some(pair) => pair,
            None => break,
        };

        // j > i, so removing j first leaves i in place
        let right = clusters.remove(j);
        let left = clusters.remove(i);

        debug!(
            merge = num_merges,
            left = left.id().as_signed(),
            right = right.id().as_signed(),
            distance = closest,
            remaining = clusters.len() + 1,
            "merging closest pair"
        );

        let vector = average(left.vector(), right.vector());

        clusters.push(ClusterNode::Branch {
            merge: num_merges,
            left: Box::new(left),
            right: Box::new(right),
            distance: closest,
            vector,
        });

        num_merges += 1;
    }

    info!(num_rows = rows.len(), num_merges, cached = distances.len(), "hierarchy built");

    clusters.pop().ok_or(Error::EmptyInput)
}
