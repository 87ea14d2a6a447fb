// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};

use crate::{
    route_cost, Algorithm, EmptyIndex, Graph, KDTree, Node, SearchError, DEFAULT_STEP_LIMIT,
};

/// Error conditions which may occur when answering a [RouteRequest].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// Latitude or longitude is not finite, or out of range.
    #[error("invalid coordinate: ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// The road network has no nodes.
    #[error(transparent)]
    EmptyIndex(#[from] EmptyIndex),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Asks for the fastest route between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    /// Latitude and longitude of the start position.
    pub start: (f64, f64),

    /// Latitude and longitude of the end position.
    pub end: (f64, f64),

    pub algorithm: Algorithm,
}

/// Answer to a [RouteRequest].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    /// Ids of the nodes along the route, empty if there is no route.
    pub path: Vec<i64>,

    /// Total travel time along the route, in seconds. Infinite if there is no route.
    pub cost: f64,

    /// Time spent on finding the nodes closest to the requested positions.
    pub resolve_time: Duration,

    /// Time spent on the route search.
    pub search_time: Duration,
}

/// Answers [RouteRequests](RouteRequest) over a road network.
///
/// A router owns a [Graph] and a [KDTree] built from its nodes; both are never modified
/// after construction. All queries take `&self` and keep their state local,
/// thus a router can be shared between threads (e.g. in an `Arc`) without any locking.
#[derive(Debug, Clone)]
pub struct Router {
    graph: Graph,
    index: KDTree,
    step_limit: usize,
}

impl Router {
    /// Creates a router over the provided [Graph], indexing all of its nodes.
    pub fn new(graph: Graph) -> Self {
        let started = Instant::now();
        let index: KDTree = graph.iter().copied().collect();
        log::debug!(
            "indexed {} nodes in {:.1} ms",
            index.len(),
            started.elapsed().as_secs_f64() * 1000.0,
        );

        Self {
            graph,
            index,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Overrides the maximum number of node expansions per search
    /// (by default [DEFAULT_STEP_LIMIT]).
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the [KDTree] over all nodes of the [Router::graph].
    pub fn index(&self) -> &KDTree {
        &self.index
    }

    pub fn step_limit(&self) -> usize {
        self.step_limit
    }

    /// Finds the network [Node] closest to the given position.
    pub fn resolve(&self, lat: f64, lon: f64) -> Result<Node, RouteError> {
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(RouteError::InvalidCoordinate { lat, lon });
        }
        Ok(self.index.find_nearest_node(lat, lon)?)
    }

    /// Snaps both positions of the request onto the road network, and finds
    /// the fastest route between them with the requested [Algorithm].
    pub fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RouteError> {
        let started = Instant::now();
        let start = self.resolve(request.start.0, request.start.1)?;
        let end = self.resolve(request.end.0, request.end.1)?;
        let resolve_time = started.elapsed();

        log::debug!(
            "routing {} ({}, {}) -> {} ({}, {}) with {}",
            start.id,
            start.lat,
            start.lon,
            end.id,
            end.lat,
            end.lon,
            request.algorithm,
        );

        let started = Instant::now();
        let path = request
            .algorithm
            .find_route(&self.graph, start.id, end.id, self.step_limit)?;
        let search_time = started.elapsed();

        let cost = if path.is_empty() {
            f64::INFINITY
        } else {
            route_cost(&self.graph, &path)
        };

        Ok(RouteResponse {
            path,
            cost,
            resolve_time,
            search_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ```text
    /// 1 ──60s── 2 ──60s── 3        4 (isolated)
    /// ```
    fn router() -> Router {
        let mut g = Graph::new();
        g.add_node(Node {
            id: 1,
            lat: 50.0,
            lon: 20.0,
        });
        g.add_node(Node {
            id: 2,
            lat: 50.0,
            lon: 20.01,
        });
        g.add_node(Node {
            id: 3,
            lat: 50.0,
            lon: 20.02,
        });
        g.add_node(Node {
            id: 4,
            lat: 51.0,
            lon: 21.0,
        });
        g.add_undirected_edge(1, 2, 60.0).unwrap();
        g.add_undirected_edge(2, 3, 60.0).unwrap();
        Router::new(g)
    }

    #[test]
    fn route() {
        let r = router();
        for algorithm in Algorithm::ALL {
            let response = r
                .route(&RouteRequest {
                    start: (50.0001, 19.9999),
                    end: (49.9999, 20.0201),
                    algorithm,
                })
                .unwrap();
            assert_eq!(response.path, vec![1, 2, 3]);
            assert_eq!(response.cost, 120.0);
        }
    }

    #[test]
    fn route_without_path() {
        let response = router()
            .route(&RouteRequest {
                start: (50.0, 20.0),
                end: (51.0, 21.0),
                algorithm: Algorithm::AStar,
            })
            .unwrap();
        assert!(response.path.is_empty());
        assert_eq!(response.cost, f64::INFINITY);
    }

    #[test]
    fn indexes_all_nodes() {
        let r = router();
        assert_eq!(r.index().len(), r.graph().len());
        assert_eq!(r.index().find_nearest_node(50.9, 20.9).unwrap().id, 4);
    }

    #[test]
    fn resolve() {
        let r = router();
        assert_eq!(r.resolve(50.2, 20.001).unwrap().id, 1);
        assert_eq!(r.resolve(50.9, 20.9).unwrap().id, 4);
        assert!(matches!(
            r.resolve(f64::NAN, 20.0),
            Err(RouteError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            r.resolve(91.0, 20.0),
            Err(RouteError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn empty_network() {
        let r = Router::new(Graph::new());
        assert_eq!(
            r.resolve(50.0, 20.0),
            Err(RouteError::EmptyIndex(EmptyIndex))
        );
        assert!(matches!(
            r.route(&RouteRequest {
                start: (50.0, 20.0),
                end: (50.0, 20.0),
                algorithm: Algorithm::Dijkstra,
            }),
            Err(RouteError::EmptyIndex(_))
        ));
    }

    #[test]
    fn step_limit() {
        let r = router().with_step_limit(1);
        assert_eq!(r.step_limit(), 1);
        assert_eq!(
            r.route(&RouteRequest {
                start: (50.0, 20.0),
                end: (50.0, 20.02),
                algorithm: Algorithm::Dijkstra,
            }),
            Err(RouteError::Search(SearchError::StepLimitExceeded))
        );
    }
}
