// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, meridian_distance, Node};

/// Returned by [KDTree::find_nearest_node] when no nodes were inserted into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("nearest node lookup in an empty index")]
pub struct EmptyIndex;

#[derive(Debug, Clone)]
struct KDNode {
    pivot: Node,
    left: Option<usize>,
    right: Option<usize>,
}

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// used to find the [Node] closest to an arbitrary position without checking every node.
///
/// Even depths of the tree split by latitude, odd depths split by longitude. All distances
/// (both to candidate nodes and to the splitting planes) are great-circle distances in meters,
/// so data spanning the antimeridian (180°/-180° longitude) is handled as well.
///
/// Tree nodes are stored in an arena and address their children by index.
/// The tree is never rebalanced, so the order of [KDTree::insert] calls determines
/// its shape - [KDTree::build] inserts nodes in an order resulting in a balanced tree.
#[derive(Debug, Default, Clone)]
pub struct KDTree {
    arena: Vec<KDNode>,
}

impl KDTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if no nodes were inserted into the tree.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Inserts a [Node] into the tree.
    pub fn insert(&mut self, node: Node) {
        let new_idx = self.arena.len();
        self.arena.push(KDNode {
            pivot: node,
            left: None,
            right: None,
        });

        if new_idx == 0 {
            return;
        }

        let mut idx = 0;
        let mut lon_divides = false;
        loop {
            let current = &mut self.arena[idx];
            let goes_left = if lon_divides {
                node.lon < current.pivot.lon
            } else {
                node.lat < current.pivot.lat
            };
            let child = if goes_left {
                &mut current.left
            } else {
                &mut current.right
            };

            match *child {
                Some(next) => idx = next,
                None => {
                    *child = Some(new_idx);
                    return;
                }
            }
            lon_divides = !lon_divides;
        }
    }

    /// Finds the [Node] closest to the given position.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Result<Node, EmptyIndex> {
        if self.arena.is_empty() {
            return Err(EmptyIndex);
        }

        let mut best = self.arena[0].pivot;
        let mut best_dist = f64::INFINITY;
        self.find_nearest_node_impl(0, lat, lon, false, &mut best, &mut best_dist);
        Ok(best)
    }

    fn find_nearest_node_impl(
        &self,
        idx: usize,
        lat: f64,
        lon: f64,
        lon_divides: bool,
        best: &mut Node,
        best_dist: &mut f64,
    ) {
        let current = &self.arena[idx];
        let pivot = current.pivot;

        let dist = earth_distance(lat, lon, pivot.lat, pivot.lon);
        if dist < *best_dist {
            *best = pivot;
            *best_dist = dist;
        }

        // Select which branch to recurse into first
        let first_left = if lon_divides {
            lon < pivot.lon
        } else {
            lat < pivot.lat
        };
        let (first, second) = if first_left {
            (current.left, current.right)
        } else {
            (current.right, current.left)
        };

        if let Some(branch) = first {
            self.find_nearest_node_impl(branch, lat, lon, !lon_divides, best, best_dist);
        }

        if let Some(branch) = second {
            // A closer node is possible in the second branch if and only if
            // the splitting plane is closer than the current best candidate.
            // Paths into the other longitude half may also wrap around the antimeridian.
            let dist_to_plane = if lon_divides {
                meridian_distance(lat, lon, pivot.lon).min(meridian_distance(lat, lon, 180.0))
            } else {
                earth_distance(lat, lon, pivot.lat, lon)
            };

            if dist_to_plane < *best_dist {
                self.find_nearest_node_impl(branch, lat, lon, !lon_divides, best, best_dist);
            }
        }
    }

    /// Builds a balanced k-d tree from a mutable slice of [Nodes](Node).
    /// Nodes will be reordered in the slice to facilitate building the tree.
    pub fn build(nodes: &mut [Node]) -> Self {
        let mut tree = Self {
            arena: Vec::with_capacity(nodes.len()),
        };
        tree.build_impl(nodes, false);
        tree
    }

    fn build_impl(&mut self, nodes: &mut [Node], lon_divides: bool) {
        if nodes.is_empty() {
            return;
        }

        if lon_divides {
            nodes.sort_by(|a, b| a.lon.total_cmp(&b.lon));
        } else {
            nodes.sort_by(|a, b| a.lat.total_cmp(&b.lat));
        }

        // Move the median to the first position among its equals, so that
        // every node on the left sorts strictly lower and goes left on insertion.
        let mut median = nodes.len() / 2;
        while median > 0 && Self::split_key(&nodes[median - 1], lon_divides)
            == Self::split_key(&nodes[median], lon_divides)
        {
            median -= 1;
        }

        self.insert(nodes[median]);
        let (left, right_and_pivot) = nodes.split_at_mut(median);
        self.build_impl(left, !lon_divides);
        self.build_impl(&mut right_and_pivot[1..], !lon_divides);
    }

    #[inline]
    fn split_key(node: &Node, lon_divides: bool) -> f64 {
        if lon_divides {
            node.lon
        } else {
            node.lat
        }
    }
}

impl FromIterator<Node> for KDTree {
    /// Builds a balanced k-d tree from an iterable of [Nodes](Node).
    fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Self {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(id: i64, lat: f64, lon: f64) -> Node {
        Node { id, lat, lon }
    }

    fn brute_force_nearest(nodes: &[Node], lat: f64, lon: f64) -> f64 {
        nodes
            .iter()
            .map(|n| earth_distance(lat, lon, n.lat, n.lon))
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn kd_tree() {
        let tree = KDTree::build(&mut [
            node(1, 0.01, 0.01),
            node(2, 0.01, 0.05),
            node(3, 0.03, 0.09),
            node(4, 0.04, 0.03),
            node(5, 0.04, 0.07),
            node(6, 0.07, 0.03),
            node(7, 0.07, 0.01),
            node(8, 0.08, 0.05),
            node(9, 0.08, 0.09),
        ]);

        assert_eq!(tree.len(), 9);
        assert_eq!(tree.find_nearest_node(0.02, 0.02).unwrap().id, 1);
        assert_eq!(tree.find_nearest_node(0.05, 0.03).unwrap().id, 4);
        assert_eq!(tree.find_nearest_node(0.05, 0.08).unwrap().id, 5);
        assert_eq!(tree.find_nearest_node(0.09, 0.06).unwrap().id, 8);
    }

    #[test]
    fn sequential_insertion() {
        let mut tree = KDTree::new();
        tree.insert(node(1, 0.0, 0.0));
        tree.insert(node(2, 10.0, 10.0));
        tree.insert(node(3, 5.0, 5.0));

        assert_eq!(tree.find_nearest_node(4.0, 4.0).unwrap().id, 3);
        assert_eq!(tree.find_nearest_node(-1.0, 0.5).unwrap().id, 1);
        assert_eq!(tree.find_nearest_node(11.0, 9.0).unwrap().id, 2);
    }

    #[test]
    fn single_node() {
        let mut tree = KDTree::new();
        tree.insert(node(7, 52.23, 21.01));
        assert_eq!(tree.find_nearest_node(-52.23, -21.01).unwrap().id, 7);
    }

    #[test]
    fn empty_tree() {
        let tree = KDTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.find_nearest_node(0.0, 0.0), Err(EmptyIndex));
        assert_eq!(KDTree::build(&mut []).find_nearest_node(0.0, 0.0), Err(EmptyIndex));
    }

    #[test]
    fn duplicate_positions() {
        let tree: KDTree = [
            node(1, 1.0, 1.0),
            node(2, 1.0, 1.0),
            node(3, 1.0, 2.0),
            node(4, 1.0, 2.0),
        ]
        .into_iter()
        .collect();

        let nearest = tree.find_nearest_node(1.0, 1.9).unwrap();
        assert!(nearest.id == 3 || nearest.id == 4);
    }

    #[test]
    fn across_antimeridian() {
        let mut tree = KDTree::new();
        tree.insert(node(1, 0.0, 0.0));
        tree.insert(node(2, 0.0, -100.0));
        tree.insert(node(3, 0.0, 179.5));
        tree.insert(node(4, 0.0, -170.0));

        assert_eq!(tree.find_nearest_node(0.0, -179.9).unwrap().id, 3);
        assert_eq!(tree.find_nearest_node(0.0, 179.0).unwrap().id, 3);
        assert_eq!(tree.find_nearest_node(0.0, -171.0).unwrap().id, 4);

        let tree: KDTree = [
            node(1, -17.8, 177.4),
            node(2, -16.8, 179.9),
            node(3, -16.7, -179.9),
            node(4, -18.1, 178.4),
        ]
        .into_iter()
        .collect();
        assert_eq!(tree.find_nearest_node(-16.75, -179.95).unwrap().id, 3);
        assert_eq!(tree.find_nearest_node(-16.8, 179.99).unwrap().id, 2);
    }

    fn arb_nodes() -> impl Strategy<Value = Vec<Node>> {
        prop::collection::vec((30.0f64..60.0, -20.0f64..40.0), 1..64).prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lon))| node(i as i64 + 1, lat, lon))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn built_tree_matches_linear_scan(
            nodes in arb_nodes(),
            lat in 25.0f64..65.0,
            lon in -25.0f64..45.0,
        ) {
            let tree: KDTree = nodes.iter().copied().collect();
            let found = tree.find_nearest_node(lat, lon).unwrap();
            let found_dist = earth_distance(lat, lon, found.lat, found.lon);
            prop_assert_eq!(found_dist, brute_force_nearest(&nodes, lat, lon));
        }

        #[test]
        fn inserted_tree_matches_linear_scan(
            nodes in arb_nodes(),
            lat in 25.0f64..65.0,
            lon in -25.0f64..45.0,
        ) {
            let mut tree = KDTree::new();
            nodes.iter().for_each(|&n| tree.insert(n));
            let found = tree.find_nearest_node(lat, lon).unwrap();
            let found_dist = earth_distance(lat, lon, found.lat, found.lon);
            prop_assert_eq!(found_dist, brute_force_nearest(&nodes, lat, lon));
        }

        #[test]
        fn whole_globe_matches_linear_scan(
            coords in prop::collection::vec((-89.0f64..89.0, -180.0f64..180.0), 1..64),
            lat in -90.0f64..90.0,
            lon in -180.0f64..180.0,
        ) {
            let nodes: Vec<Node> = coords
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lon))| node(i as i64 + 1, lat, lon))
                .collect();

            let mut inserted = KDTree::new();
            nodes.iter().for_each(|&n| inserted.insert(n));
            let built: KDTree = nodes.iter().copied().collect();
            let expected = brute_force_nearest(&nodes, lat, lon);

            for tree in [inserted, built] {
                let found = tree.find_nearest_node(lat, lon).unwrap();
                let found_dist = earth_distance(lat, lon, found.lat, found.lon);
                prop_assert_eq!(found_dist, expected);
            }
        }
    }
}
