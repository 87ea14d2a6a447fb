// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Shortest-route queries over [OpenStreetMap](https://www.openstreetmap.org/) road networks.
//!
//! OSM data is converted into a weighted directed graph, where the weight of every edge
//! is the time (in seconds) needed to traverse a road segment at its speed limit.
//! A [k-d tree](KDTree) maps arbitrary coordinates onto the nearest road node, and
//! one of three [algorithms](Algorithm) finds the fastest route between two nodes:
//! Dijkstra, A* and bidirectional A*.
//!
//! The graph and the index are built once and then only read, so a single [Router]
//! can answer any number of queries concurrently.
//!
//! # Example
//!
//! ```no_run
//! let mut g = routefinder::Graph::new();
//! let osm_options = routefinder::osm::Options {
//!     profile: &routefinder::osm::CAR_PROFILE,
//!     file_format: routefinder::osm::FileFormat::Unknown,
//!     bbox: [0.0; 4],
//! };
//! routefinder::osm::add_features_from_file(&mut g, &osm_options, "path/to/monaco.osm")
//!     .expect("failed to load monaco.osm");
//!
//! let router = routefinder::Router::new(g);
//! let response = router
//!     .route(&routefinder::RouteRequest {
//!         start: (43.7384, 7.4246),
//!         end: (43.7478, 7.4323),
//!         algorithm: routefinder::Algorithm::BidirectionalAStar,
//!     })
//!     .expect("failed to find route");
//!
//! println!("Route: {:?}", response.path);
//! ```

mod distance;
mod graph;
mod kd;
pub mod osm;
mod router;
mod search;
#[cfg(feature = "server")]
pub mod server;

pub use distance::{earth_distance, heuristic_distance, meridian_distance};
pub use graph::{Graph, GraphError};
pub use kd::{EmptyIndex, KDTree};
pub use router::{RouteError, RouteRequest, RouteResponse, Router};
pub use search::{
    find_route_astar, find_route_bidirectional, find_route_dijkstra, route_cost, Algorithm,
    ParseAlgorithmError, SearchError, DEFAULT_STEP_LIMIT,
};

/// Represents a routable point of the road network.
///
/// Nodes with `id == 0` are disallowed. Once created, nodes are never
/// moved, as that would invalidate the weights of their edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// Represents a one-way connection between two [Nodes](Node).
///
/// In the outgoing edge lists of a [Graph], `to` is the node at the end of the connection;
/// in the incoming edge lists, `to` is the node at the start of the connection.
///
/// `weight` is the time (in seconds) needed to traverse the connection,
/// and is always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub weight: f64,
}
