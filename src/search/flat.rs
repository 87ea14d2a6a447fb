// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use super::common::{known_cost, reconstruct_path, Heuristic, QueueItem};
use crate::{Edge, Graph, SearchError};

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the fastest route between two nodes in the provided graph.
///
/// Returns an empty vector if there is no route between the two nodes,
/// and a single-element vector if both nodes are the same.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [SearchError::StepLimitExceeded]. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_route_dijkstra(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Vec<i64>, SearchError> {
    find_route_flat(g, from_id, to_id, step_limit, |_| 0.0)
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the fastest route between two nodes in the provided graph.
///
/// The remaining travel time is estimated from the axis-aligned
/// [heuristic_distance](crate::heuristic_distance) and the highest speed in the graph.
/// This estimate never exceeds the actual travel time, so the returned route
/// is as fast as the one returned by [find_route_dijkstra].
///
/// Returns an empty vector if there is no route between the two nodes,
/// and a single-element vector if both nodes are the same.
/// See [find_route_dijkstra] for the description of `step_limit`.
pub fn find_route_astar(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Vec<i64>, SearchError> {
    let to_node = g.get_node(to_id).ok_or(SearchError::UnknownNode(to_id))?;
    let heuristic = Heuristic::towards(g, to_node);
    find_route_flat(g, from_id, to_id, step_limit, |node_id| {
        heuristic.estimate(g, node_id)
    })
}

fn find_route_flat<H: Fn(i64) -> f64>(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
    heuristic: H,
) -> Result<Vec<i64>, SearchError> {
    if g.get_node(from_id).is_none() {
        return Err(SearchError::UnknownNode(from_id));
    }
    if g.get_node(to_id).is_none() {
        return Err(SearchError::UnknownNode(to_id));
    }
    if from_id == to_id {
        return Ok(vec![from_id]);
    }

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut steps: usize = 0;

    queue.push(QueueItem {
        at: from_id,
        cost: 0.0,
        score: heuristic(from_id),
    });
    known_costs.insert(from_id, 0.0);

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            log::debug!("route {from_id} -> {to_id} found after {steps} steps");
            return Ok(reconstruct_path(&came_from, to_id));
        }

        // Multiple items may be kept in the queue for the same node - skip the outdated ones.
        if item.cost > known_cost(&known_costs, item.at) {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(SearchError::StepLimitExceeded);
        }

        for &Edge {
            to: neighbor_id,
            weight,
        } in g.neighbors(item.at).unwrap_or_default()
        {
            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + weight;
            if neighbor_cost >= known_cost(&known_costs, neighbor_id) {
                continue;
            }

            // Push the new item into the queue
            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
                score: neighbor_cost + heuristic(neighbor_id),
            });
        }
    }

    log::debug!("no route {from_id} -> {to_id} after {steps} steps");
    Ok(vec![])
}
