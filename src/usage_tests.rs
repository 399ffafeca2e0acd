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

#[cfg(test)]
mod tests {

    use crate::{
        calculate_similar_items, get_recommendations, get_recommended_items, hierarchical_cluster,
        top_matches, transform_preferences, Dataset, KMeans, Mds, PearsonDistance,
        SimilarityMetric,
    };
    use crate::outline::outline;
    use crate::types::preferences_from;

    #[test]
    fn programmatic_usage_of_recommenders() {

        /* Our input data comprises of ratings that people gave to items. The identifiers can
           be strings of arbitrary length and structure. */
        let preferences = preferences_from(vec![
            ("alice", "apple", 4.0),
            ("alice", "dog", 3.0),
            ("alice", "pony", 5.0),
            ("bob", "apple", 4.5),
            ("bob", "pony", 4.0),
            ("bob", "bike", 2.0),
            ("charles", "pony", 1.0),
            ("charles", "apple", 2.0),
            ("charles", "bike", 5.0),
        ]);

        /* Who rates like alice? */
        let neighbours = top_matches(&preferences, "alice", 2, &SimilarityMetric::Euclidean)
            .unwrap();
        assert_eq!(neighbours.len(), 2);
        assert_eq!(neighbours[0].item, "bob");

        /* User-based recommendations weight the ratings of others by their similarity. */
        let recommendations =
            get_recommendations(&preferences, "alice", &SimilarityMetric::Euclidean).unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].item, "bike");

        /* Swapping roles gives us the people that might like an item. */
        let items = transform_preferences(&preferences);
        assert_eq!(items.len(), 4);
        assert!(items["dog"].contains_key("alice"));

        /* Item-based recommendations precompute the neighbours of every item once and reuse
           them across many queries. */
        let index = calculate_similar_items(&preferences, 10, &SimilarityMetric::Euclidean)
            .unwrap();

        for person in &["alice", "bob", "charles"] {
            let recommended = get_recommended_items(&preferences, &index, person).unwrap();
            for scored_item in recommended.iter() {
                assert!(!preferences[*person].contains_key(&scored_item.item));
            }
        }
    }

    #[test]
    fn programmatic_usage_of_clustering() {

        /* Word counts per blog, the kind of data a feed parser would produce. */
        let dataset = Dataset::new(
            vec!["gadgets".into(), "gizmos".into(), "politics".into(), "elections".into()],
            vec!["phone".into(), "battery".into(), "vote".into(), "senate".into()],
            vec![
                vec![12.0, 9.0, 0.0, 1.0],
                vec![10.0, 11.0, 1.0, 0.0],
                vec![0.0, 1.0, 14.0, 9.0],
                vec![1.0, 0.0, 11.0, 12.0],
            ],
        ).unwrap();

        /* A merge tree over all blogs, printed as an outline. */
        let tree = hierarchical_cluster(&dataset.data, &PearsonDistance).unwrap();
        assert_eq!(tree.leaf_count(), 4);

        let printed = outline(&tree, Some(dataset.row_names.as_slice()));
        assert_eq!(printed.lines().count(), 7);
        assert!(printed.starts_with("-\n"));

        /* The same works for the words, by clustering the columns. */
        let words = dataset.transpose();
        let word_tree = hierarchical_cluster(&words.data, &PearsonDistance).unwrap();
        assert_eq!(word_tree.leaf_count(), 4);

        /* Flat alternatives: k-means and a projection onto the plane. */
        let partition = KMeans::new(2).with_seed(42).cluster(&dataset.data, &PearsonDistance)
            .unwrap();
        assert_eq!(partition.clusters.iter().map(|c| c.len()).sum::<usize>(), 4);

        let projection = Mds::new().with_seed(42).project(&dataset.data, &PearsonDistance)
            .unwrap();
        assert_eq!(projection.points.len(), 4);
    }
}
