// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::{heuristic_distance, Graph, Node};

#[derive(Debug, Clone, Copy)]
pub(super) struct QueueItem {
    pub at: i64,
    pub cost: f64,
    pub score: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.score.total_cmp(&self.score)
    }
}

/// Lower bound of the travel time from any node to a fixed target node.
///
/// Computed as [heuristic_distance] divided by the [fastest speed](Graph::max_speed)
/// in the graph. If the speed is unknown, zero or infinite, the estimate is always zero,
/// turning A* into Dijkstra's algorithm.
#[derive(Debug, Clone, Copy)]
pub(super) struct Heuristic {
    target: Node,
    inverse_speed: f64,
}

impl Heuristic {
    pub(super) fn towards(g: &Graph, target: Node) -> Self {
        let speed = g.max_speed();
        let inverse_speed = if speed.is_normal() { speed.recip() } else { 0.0 };
        Self {
            target,
            inverse_speed,
        }
    }

    pub(super) fn estimate(&self, g: &Graph, node_id: i64) -> f64 {
        if self.inverse_speed == 0.0 {
            return 0.0;
        }

        g.get_node(node_id).map_or(0.0, |n| {
            heuristic_distance(n.lat, n.lon, self.target.lat, self.target.lon) * self.inverse_speed
        })
    }
}

#[inline]
pub(super) fn known_cost(known_costs: &HashMap<i64, f64>, node_id: i64) -> f64 {
    known_costs.get(&node_id).copied().unwrap_or(f64::INFINITY)
}

/// Follows the predecessor links from `last` back to the node without a predecessor,
/// and returns the visited nodes in the start-to-`last` order.
pub(super) fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}
