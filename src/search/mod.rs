// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod bidirectional;
mod common;
mod error;
mod flat;

use std::fmt;
use std::str::FromStr;

use crate::Graph;

pub use bidirectional::find_route_bidirectional;
pub use error::{SearchError, DEFAULT_STEP_LIMIT};
pub use flat::{find_route_astar, find_route_dijkstra};

/// Selects the route search algorithm.
///
/// All algorithms return equally fast routes (though not necessarily the same routes,
/// if multiple fastest routes exist), and differ only in how many nodes they need to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Uniform-cost search, see [find_route_dijkstra].
    Dijkstra,

    /// Heuristic search, see [find_route_astar].
    AStar,

    /// Bidirectional heuristic search, see [find_route_bidirectional].
    #[default]
    BidirectionalAStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Self::Dijkstra, Self::AStar, Self::BidirectionalAStar];

    /// Returns the name of the algorithm, as accepted by [Algorithm::from_str].
    pub fn name(self) -> &'static str {
        match self {
            Self::Dijkstra => "dijkstra",
            Self::AStar => "a-star",
            Self::BidirectionalAStar => "bidirectional-a-star",
        }
    }

    /// Finds the fastest route between two nodes with the selected algorithm.
    pub fn find_route(
        self,
        g: &Graph,
        from_id: i64,
        to_id: i64,
        step_limit: usize,
    ) -> Result<Vec<i64>, SearchError> {
        match self {
            Self::Dijkstra => find_route_dijkstra(g, from_id, to_id, step_limit),
            Self::AStar => find_route_astar(g, from_id, to_id, step_limit),
            Self::BidirectionalAStar => find_route_bidirectional(g, from_id, to_id, step_limit),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unknown [Algorithm] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown algorithm: {0:?} (expected one of: dijkstra, a-star, bidirectional-a-star)")]
pub struct ParseAlgorithmError(pub String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| ParseAlgorithmError(s.to_string()))
    }
}

/// Sums the weights of edges along a route.
///
/// Returns 0 for routes with fewer than two nodes and [f64::INFINITY]
/// if any two consecutive nodes are not connected.
pub fn route_cost(g: &Graph, route: &[i64]) -> f64 {
    route
        .windows(2)
        .map(|pair| g.get_edge(pair[0], pair[1]))
        .sum()
}
