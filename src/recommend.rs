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

use fnv::FnvHashMap;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::similarity::Similarity;
use crate::types;
use crate::types::{ItemSimilarityIndex, Preferences, RankedList, ScoredItem};

/// Accumulates similarity-weighted ratings per candidate item.
#[derive(Default)]
struct Candidates {
    weighted_totals: FnvHashMap<String, f64>,
    similarity_sums: FnvHashMap<String, f64>,
}

impl Candidates {

    fn add(&mut self, item: &str, rating: f64, similarity: f64) {
        *self.weighted_totals.entry(item.to_owned()).or_insert(0.0) += rating * similarity;
        *self.similarity_sums.entry(item.to_owned()).or_insert(0.0) += similarity;
    }

    /// Normalizes each total by the similarities that contributed to it, so the score is a
    /// similarity-weighted average rating. Candidates whose similarities cancel out to zero
    /// have no defined average and are left out.
    fn into_ranked(self) -> RankedList {
        let similarity_sums = self.similarity_sums;

        types::rank(self.weighted_totals.into_iter()
            .filter_map(|(item, total)| {
                let similarity_sum = similarity_sums[&item];
                if similarity_sum == 0.0 {
                    None
                } else {
                    Some(ScoredItem { item, score: total / similarity_sum })
                }
            }))
    }
}

/// The `n` entities most similar to `target`, best first. Empty preferences yield an empty list.
pub fn top_matches<S>(
    preferences: &Preferences,
    target: &str,
    n: usize,
    similarity: &S,
) -> Result<RankedList> where S: Similarity + ?Sized {

    if preferences.is_empty() {
        return Ok(Vec::new());
    }

    if !preferences.contains_key(target) {
        return Err(Error::unknown_entity(target));
    }

    let mut scores = Vec::with_capacity(preferences.len());

    for other in preferences.keys() {
        if other != target {
            let score = similarity.score(preferences, target, other)?;
            scores.push(ScoredItem::new(other.as_str(), score));
        }
    }

    Ok(types::top_k(scores, n))
}

/// User-based recommendations: every item `target` has not rated, scored by the average of
/// the ratings other entities gave it, weighted by their similarity to `target`. Entities
/// with a similarity of zero or below do not contribute.
pub fn get_recommendations<S>(
    preferences: &Preferences,
    target: &str,
    similarity: &S,
) -> Result<RankedList> where S: Similarity + ?Sized {

    let history = preferences.get(target).ok_or_else(|| Error::unknown_entity(target))?;

    let mut candidates = Candidates::default();
    let mut num_neighbours = 0;

    for (other, other_ratings) in preferences.iter() {

        if other == target {
            continue;
        }

        let sim = similarity.score(preferences, target, other)?;

        if sim <= 0.0 {
            continue;
        }

        num_neighbours += 1;

        for (item, rating) in other_ratings.iter() {
            if !history.contains_key(item) {
                candidates.add(item, *rating, sim);
            }
        }
    }

    debug!(entity = target, num_neighbours, "accumulated user-based candidates");

    Ok(candidates.into_ranked())
}

/// Flips entities and items, e.g. from critic to movie ratings into movie to critic ratings.
pub fn transform_preferences(preferences: &Preferences) -> Preferences {

    let mut transposed = types::new_preferences(preferences.len());

    for (entity, ratings) in preferences.iter() {
        for (item, rating) in ratings.iter() {
            transposed.entry(item.clone())
                .or_insert_with(|| types::new_ratings(10))
                .insert(entity.clone(), *rating);
        }
    }

    transposed
}

/// Computes the `n` most similar items for every item once, to be reused across many
/// item-based recommendation queries.
pub fn calculate_similar_items<S>(
    preferences: &Preferences,
    n: usize,
    similarity: &S,
) -> Result<ItemSimilarityIndex> where S: Similarity + ?Sized {

    let item_preferences = transform_preferences(preferences);

    let mut index: ItemSimilarityIndex =
        FnvHashMap::with_capacity_and_hasher(item_preferences.len(), Default::default());

    for (count, item) in item_preferences.keys().enumerate() {

        if count % 100 == 0 {
            debug!(count, num_items = item_preferences.len(), "computing similar items");
        }

        let similar_items = top_matches(&item_preferences, item, n, similarity)?;
        index.insert(item.clone(), similar_items);
    }

    info!(num_items = index.len(), n, "item similarity index built");

    Ok(index)
}

/// Item-based recommendations: walks the precomputed neighbours of every item `target` rated
/// and scores each unrated neighbour by the rating-weighted average of its similarities.
/// Negative similarities count as well; a neighbour whose similarities sum to zero is skipped.
pub fn get_recommended_items(
    preferences: &Preferences,
    index: &ItemSimilarityIndex,
    target: &str,
) -> Result<RankedList> {

    let history = preferences.get(target).ok_or_else(|| Error::unknown_entity(target))?;

    let mut candidates = Candidates::default();

    for (item, rating) in history.iter() {

        let similar_items = index.get(item).ok_or_else(|| Error::unknown_item(item))?;

        for similar_item in similar_items.iter() {
            if !history.contains_key(&similar_item.item) {
                candidates.add(&similar_item.item, *rating, similar_item.score);
            }
        }
    }

    Ok(candidates.into_ranked())
}
