// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use super::common::{known_cost, reconstruct_path, Heuristic, QueueItem};
use crate::{Edge, Graph, SearchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Follows outgoing edges, away from the start node.
    Forward,

    /// Follows incoming edges, away from the end node.
    Backward,
}

/// Best connection between the two halves of the search found so far.
#[derive(Debug, Clone, Copy)]
struct Meeting {
    node_id: Option<i64>,
    cost: f64,
}

/// State of one of the two A* searches which make up a bidirectional search.
struct HalfSearch {
    direction: Direction,
    heuristic: Heuristic,
    queue: BinaryHeap<QueueItem>,
    came_from: HashMap<i64, i64>,
    known_costs: HashMap<i64, f64>,
}

impl HalfSearch {
    fn new(g: &Graph, direction: Direction, origin_id: i64, heuristic: Heuristic) -> Self {
        let mut s = Self {
            direction,
            heuristic,
            queue: BinaryHeap::default(),
            came_from: HashMap::default(),
            known_costs: HashMap::default(),
        };
        s.queue.push(QueueItem {
            at: origin_id,
            cost: 0.0,
            score: heuristic.estimate(g, origin_id),
        });
        s.known_costs.insert(origin_id, 0.0);
        s
    }

    /// Returns the lowest score in the queue, or [f64::INFINITY] if the queue is empty.
    fn min_score(&self) -> f64 {
        self.queue.peek().map_or(f64::INFINITY, |item| item.score)
    }

    /// Expands a single (non-outdated) node from the queue. Every relaxed node which
    /// was already reached by the `other` search is a candidate for the `meeting` point.
    fn expand(
        &mut self,
        g: &Graph,
        other: &HalfSearch,
        meeting: &mut Meeting,
        steps: &mut usize,
        step_limit: usize,
    ) -> Result<(), SearchError> {
        while let Some(item) = self.queue.pop() {
            if item.cost > known_cost(&self.known_costs, item.at) {
                continue;
            }

            *steps += 1;
            if *steps > step_limit {
                return Err(SearchError::StepLimitExceeded);
            }

            let edges = match self.direction {
                Direction::Forward => g.neighbors(item.at),
                Direction::Backward => g.incoming(item.at),
            };

            for &Edge {
                to: neighbor_id,
                weight,
            } in edges.unwrap_or_default()
            {
                let neighbor_cost = item.cost + weight;
                if neighbor_cost >= known_cost(&self.known_costs, neighbor_id) {
                    continue;
                }

                self.came_from.insert(neighbor_id, item.at);
                self.known_costs.insert(neighbor_id, neighbor_cost);
                self.queue.push(QueueItem {
                    at: neighbor_id,
                    cost: neighbor_cost,
                    score: neighbor_cost + self.heuristic.estimate(g, neighbor_id),
                });

                let total_cost = neighbor_cost + known_cost(&other.known_costs, neighbor_id);
                if total_cost < meeting.cost {
                    meeting.node_id = Some(neighbor_id);
                    meeting.cost = total_cost;
                }
            }

            return Ok(());
        }

        Ok(())
    }
}

/// Uses a bidirectional variant of the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the fastest route between two nodes in the provided graph.
///
/// Two searches run in alternation: a forward one from the start node towards the end node,
/// and a backward one (over reversed edges) from the end node towards the start node.
/// Every time one search reaches a node already reached by the other one, the
/// combined cost through that node is a candidate route. The search stops once
/// the lowest score in either queue is not lower than the best candidate, as then
/// no cheaper route can exist. The returned route is as fast as the one returned by
/// [find_route_dijkstra](crate::find_route_dijkstra).
///
/// Returns an empty vector if there is no route between the two nodes,
/// and a single-element vector if both nodes are the same.
/// `step_limit` bounds the number of node expansions of both searches combined.
pub fn find_route_bidirectional(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Vec<i64>, SearchError> {
    let from_node = g.get_node(from_id).ok_or(SearchError::UnknownNode(from_id))?;
    let to_node = g.get_node(to_id).ok_or(SearchError::UnknownNode(to_id))?;
    if from_id == to_id {
        return Ok(vec![from_id]);
    }

    let mut forward = HalfSearch::new(
        g,
        Direction::Forward,
        from_id,
        Heuristic::towards(g, to_node),
    );
    let mut backward = HalfSearch::new(
        g,
        Direction::Backward,
        to_id,
        Heuristic::towards(g, from_node),
    );
    let mut meeting = Meeting {
        node_id: None,
        cost: f64::INFINITY,
    };
    let mut steps: usize = 0;

    // An empty queue has a minimum score of infinity, which also ends the search
    while forward.min_score() < meeting.cost && backward.min_score() < meeting.cost {
        forward.expand(g, &backward, &mut meeting, &mut steps, step_limit)?;
        backward.expand(g, &forward, &mut meeting, &mut steps, step_limit)?;
    }

    match meeting.node_id {
        Some(meeting_id) => {
            log::debug!(
                "route {from_id} -> {to_id} found after {steps} steps, meeting at {meeting_id}"
            );

            let mut path = reconstruct_path(&forward.came_from, meeting_id);
            let mut at = meeting_id;
            while let Some(&next) = backward.came_from.get(&at) {
                path.push(next);
                at = next;
            }
            Ok(path)
        }

        None => {
            log::debug!("no route {from_id} -> {to_id} after {steps} steps");
            Ok(vec![])
        }
    }
}
