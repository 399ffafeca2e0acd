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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fnv::FnvHashMap;

/// Ratings of a single entity, keyed by item. A missing key means "no opinion".
pub type Ratings = FnvHashMap<String, f64>;

/// Entity to ratings, e.g. critic to movie ratings. The engines only ever read it.
pub type Preferences = FnvHashMap<String, Ratings>;

/// Ranked list, best entry first.
pub type RankedList = Vec<ScoredItem>;

/// Precomputed most similar items per item, used for item-based recommendation.
pub type ItemSimilarityIndex = FnvHashMap<String, RankedList>;

pub fn new_ratings(capacity: usize) -> Ratings {
    FnvHashMap::with_capacity_and_hasher(capacity, Default::default())
}

pub fn new_preferences(capacity: usize) -> Preferences {
    FnvHashMap::with_capacity_and_hasher(capacity, Default::default())
}

/// Builds preferences from `(entity, item, rating)` triples. Later triples overwrite earlier
/// ones for the same entity and item.
pub fn preferences_from<I, E, T>(triples: I) -> Preferences
    where I: IntoIterator<Item=(E, T, f64)>, E: Into<String>, T: Into<String> {

    let mut preferences = new_preferences(10);

    for (entity, item, rating) in triples {
        preferences.entry(entity.into())
            .or_insert_with(|| new_ratings(10))
            .insert(item.into(), rating);
    }

    preferences
}

/// A labelled score. Used both as the element of ranked lists and, through its reversed
/// ordering, as the element of the bounded max-heap that keeps the top-k candidates.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: String,
    pub score: f64,
}

impl ScoredItem {
    pub fn new<S: Into<String>>(item: S, score: f64) -> Self {
        ScoredItem { item: item.into(), score }
    }
}

/// Higher scores order first. There is no total order on floats, so incomparable scores are
/// treated as equal and fall through to the label, which also orders descending.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    let by_score = match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        Some(Ordering::Equal) => Ordering::Equal,
        None => Ordering::Equal
    };

    by_score.then_with(|| scored_item_b.item.cmp(&scored_item_a.item))
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// Sorts all candidates into a ranked list.
pub fn rank<I>(candidates: I) -> RankedList where I: IntoIterator<Item=ScoredItem> {
    let mut ranked: RankedList = candidates.into_iter().collect();
    ranked.sort();
    ranked
}

/// Keeps the `k` best candidates in a bounded heap whose top is the worst retained entry.
pub fn top_k<I>(candidates: I, k: usize) -> RankedList where I: IntoIterator<Item=ScoredItem> {

    if k == 0 {
        return Vec::new();
    }

    let mut heap = BinaryHeap::with_capacity(k);

    for scored_item in candidates {
        if heap.len() < k {
            heap.push(scored_item);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    heap.into_sorted_vec()
}

#[cfg(test)]
mod tests {

    use std::f64::EPSILON;

    use super::{preferences_from, rank, top_k, ScoredItem};

    #[test]
    fn scored_item_ordering_reversed() {
        let item_a = ScoredItem::new("a", 0.5);
        let item_b = ScoredItem::new("b", 1.5);
        let item_c = ScoredItem::new("c", 0.3);

        assert!(item_a > item_b);
        assert!(item_a < item_c);
        assert!(item_b < item_c);
    }

    #[test]
    fn ties_order_by_label_descending() {
        let ranked = rank(vec![
            ScoredItem::new("apple", 1.0),
            ScoredItem::new("pony", 1.0),
            ScoredItem::new("dog", 2.0),
        ]);

        let labels: Vec<&str> = ranked.iter().map(|s| s.item.as_str()).collect();
        assert_eq!(labels, vec!["dog", "pony", "apple"]);
    }

    fn within_epsilon(value: f64, expected: f64) -> bool {
        (value - expected).abs() < EPSILON
    }

    #[test]
    fn topk() {

        const K: usize = 3;

        let items = vec![
            ScoredItem::new("1", 0.5),
            ScoredItem::new("2", 1.5),
            ScoredItem::new("3", 0.3),
            ScoredItem::new("4", 3.5),
            ScoredItem::new("5", 2.5),
        ];

        let top = top_k(items, K);

        assert_eq!(top.len(), 3);

        assert_eq!(top[0].item, "4");
        assert!(within_epsilon(top[0].score, 3.5));

        assert_eq!(top[1].item, "5");
        assert!(within_epsilon(top[1].score, 2.5));

        assert_eq!(top[2].item, "2");
        assert!(within_epsilon(top[2].score, 1.5));
    }

    #[test]
    fn topk_with_zero_or_few_candidates() {
        assert!(top_k(vec![ScoredItem::new("a", 1.0)], 0).is_empty());
        assert_eq!(top_k(vec![ScoredItem::new("a", 1.0)], 5).len(), 1);
    }

    #[test]
    fn later_triples_overwrite() {
        let preferences = preferences_from(vec![
            ("alice", "apple", 1.0),
            ("alice", "apple", 4.0),
            ("bob", "pony", 2.0),
        ]);

        assert_eq!(preferences.len(), 2);
        assert!(within_epsilon(preferences["alice"]["apple"], 4.0));
    }
}
