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

use crate::hierarchy::ClusterNode;

/// Renders a cluster tree as an indented outline, one node per line. Branches show as `-`,
/// leaves as their label, or their row index when no labels are given.
pub fn outline(tree: &ClusterNode, labels: Option<&[String]>) -> String {

    let mut out = String::new();

    for (depth, node) in tree.walk() {

        for _ in 0..depth {
            out.push_str("  ");
        }

        match node {
            ClusterNode::Branch { .. } => out.push('-'),
            ClusterNode::Leaf { row, .. } => {
                match labels.and_then(|labels| labels.get(*row)) {
                    Some(label) => out.push_str(label),
                    None => out.push_str(&row.to_string()),
                }
            }
        }

        out.push('\n');
    }

    out
}
