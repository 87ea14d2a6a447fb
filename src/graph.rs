// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Edge, Node};
use std::collections::btree_map::{BTreeMap, Entry};

/// Error conditions which may occur when inserting or querying [Edges](Edge) of a [Graph].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// The referenced node was never added to the graph.
    #[error("unknown node: {0}")]
    UnknownNode(i64),

    /// Edge weights must be finite and non-negative.
    #[error("invalid weight of edge {from} -> {to}: {weight}")]
    InvalidEdgeWeight { from: i64, to: i64, weight: f64 },
}

#[derive(Debug, Clone)]
struct Adjacency {
    node: Node,
    outgoing: Vec<Edge>,
    incoming: Vec<Edge>,
}

/// Represents a road network as a set of [Nodes](Node)
/// and weighted, directed [Edges](Edge) between them.
///
/// A graph is meant to be built once and then only queried. All query methods
/// take `&self`, so a built graph can be freely shared between threads.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: BTreeMap<i64, Adjacency>,
    edge_count: usize,
    max_speed: f64,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of directed edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns an iterator over all [Nodes](Node) in the graph.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(|adj| &adj.node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.nodes.get(&id).map(|adj| adj.node)
    }

    /// Registers a [Node] in the graph.
    ///
    /// Nodes are immutable once added: if a node with the same id already exists,
    /// it is kept, and `false` is returned. Nodes with `id == 0` are rejected
    /// the same way.
    pub fn add_node(&mut self, node: Node) -> bool {
        if node.id == 0 {
            return false;
        }

        match self.nodes.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert(Adjacency {
                    node,
                    outgoing: Vec::default(),
                    incoming: Vec::default(),
                });
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Adds a directed [Edge] from one registered node to another.
    ///
    /// Both nodes must have been previously added with [Graph::add_node],
    /// and the weight must be finite and non-negative.
    pub fn add_edge(&mut self, from_id: i64, to_id: i64, weight: f64) -> Result<(), GraphError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidEdgeWeight {
                from: from_id,
                to: to_id,
                weight,
            });
        }

        let from = self.get_node(from_id).ok_or(GraphError::UnknownNode(from_id))?;
        let to = self.get_node(to_id).ok_or(GraphError::UnknownNode(to_id))?;

        let distance = earth_distance(from.lat, from.lon, to.lat, to.lon);
        let speed = if weight > 0.0 {
            distance / weight
        } else if distance > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        self.max_speed = self.max_speed.max(speed);

        if let Some(adj) = self.nodes.get_mut(&from_id) {
            adj.outgoing.push(Edge { to: to_id, weight });
        }
        if let Some(adj) = self.nodes.get_mut(&to_id) {
            adj.incoming.push(Edge { to: from_id, weight });
        }
        self.edge_count += 1;
        Ok(())
    }

    /// Adds two opposing [Edges](Edge) with the same weight between two registered nodes.
    pub fn add_undirected_edge(&mut self, a: i64, b: i64, weight: f64) -> Result<(), GraphError> {
        self.add_edge(a, b, weight)?;
        self.add_edge(b, a, weight)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    ///
    /// Returns an empty slice for nodes without outgoing edges,
    /// and [GraphError::UnknownNode] for nodes which are not in the graph.
    pub fn neighbors(&self, from_id: i64) -> Result<&[Edge], GraphError> {
        self.nodes
            .get(&from_id)
            .map(|adj| adj.outgoing.as_slice())
            .ok_or(GraphError::UnknownNode(from_id))
    }

    /// Gets all incoming [Edges](Edge) of a node with a given id.
    /// [Edge::to] of the returned edges refers to the _source_ node.
    pub fn incoming(&self, to_id: i64) -> Result<&[Edge], GraphError> {
        self.nodes
            .get(&to_id)
            .map(|adj| adj.incoming.as_slice())
            .ok_or(GraphError::UnknownNode(to_id))
    }

    /// Gets the weight of the cheapest [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f64 {
        self.nodes
            .get(&from_id)
            .into_iter()
            .flat_map(|adj| adj.outgoing.iter())
            .filter(|e| e.to == to_id)
            .map(|e| e.weight)
            .fold(f64::INFINITY, f64::min)
    }

    /// Returns the highest speed (in meters per second) over any edge,
    /// that is the highest ratio between the great-circle length of an edge and its weight.
    ///
    /// Dividing a lower bound of the remaining distance by this value gives a lower bound
    /// of the remaining travel time. Returns 0 for graphs without edges and
    /// [f64::INFINITY] if there's a zero-weight edge between two distinct positions.
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, lat: f64, lon: f64) -> Node {
        Node { id, lat, lon }
    }

    fn simple_graph() -> Graph {
        let mut g = Graph::new();
        g.add_node(node(1, 0.0, 0.0));
        g.add_node(node(2, 0.0, 0.01));
        g.add_node(node(3, 0.01, 0.01));
        g.add_edge(1, 2, 100.0).unwrap();
        g.add_undirected_edge(2, 3, 50.0).unwrap();
        g
    }

    #[test]
    fn add_edge() {
        let g = simple_graph();
        assert_eq!(g.len(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.get_edge(1, 2), 100.0);
        assert_eq!(g.get_edge(2, 1), f64::INFINITY);
        assert_eq!(g.get_edge(2, 3), 50.0);
        assert_eq!(g.get_edge(3, 2), 50.0);
    }

    #[test]
    fn neighbors() {
        let g = simple_graph();
        assert_eq!(
            g.neighbors(1).unwrap(),
            &[Edge {
                to: 2,
                weight: 100.0
            }]
        );
        assert_eq!(g.neighbors(2).unwrap().len(), 1);
        assert_eq!(g.neighbors(42), Err(GraphError::UnknownNode(42)));
    }

    #[test]
    fn neighbors_of_node_without_edges() {
        let mut g = simple_graph();
        g.add_node(node(4, 1.0, 1.0));
        assert!(g.neighbors(4).unwrap().is_empty());
    }

    #[test]
    fn incoming() {
        let g = simple_graph();
        assert!(g.incoming(1).unwrap().is_empty());

        let mut incoming_to_2: Vec<i64> = g.incoming(2).unwrap().iter().map(|e| e.to).collect();
        incoming_to_2.sort();
        assert_eq!(incoming_to_2, vec![1, 3]);

        assert_eq!(g.incoming(42), Err(GraphError::UnknownNode(42)));
    }

    #[test]
    fn rejects_invalid_weights() {
        let mut g = simple_graph();
        assert_eq!(
            g.add_edge(1, 3, -1.0),
            Err(GraphError::InvalidEdgeWeight {
                from: 1,
                to: 3,
                weight: -1.0
            })
        );
        assert!(matches!(
            g.add_edge(1, 3, f64::NAN),
            Err(GraphError::InvalidEdgeWeight { .. })
        ));
        assert!(matches!(
            g.add_edge(1, 3, f64::INFINITY),
            Err(GraphError::InvalidEdgeWeight { .. })
        ));
        assert_eq!(g.get_edge(1, 3), f64::INFINITY);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn rejects_unknown_endpoints() {
        let mut g = simple_graph();
        assert_eq!(g.add_edge(1, 42, 1.0), Err(GraphError::UnknownNode(42)));
        assert_eq!(g.add_edge(42, 1, 1.0), Err(GraphError::UnknownNode(42)));
        assert_eq!(g.neighbors(1).unwrap().len(), 1);
    }

    #[test]
    fn nodes_are_immutable() {
        let mut g = simple_graph();
        assert!(!g.add_node(node(1, 5.0, 5.0)));
        assert_eq!(g.get_node(1), Some(node(1, 0.0, 0.0)));
    }

    #[test]
    fn zero_id_is_rejected() {
        let mut g = simple_graph();
        assert!(!g.add_node(node(0, 1.0, 1.0)));
        assert_eq!(g.len(), 3);
        assert!(g.get_node(0).is_none());
        assert_eq!(g.add_edge(1, 0, 1.0), Err(GraphError::UnknownNode(0)));
    }

    #[test]
    fn max_speed() {
        let mut g = Graph::new();
        assert_eq!(g.max_speed(), 0.0);

        g.add_node(node(1, 0.0, 0.0));
        g.add_node(node(2, 0.0, 0.01));
        g.add_edge(1, 2, 100.0).unwrap();
        let expected = earth_distance(0.0, 0.0, 0.0, 0.01) / 100.0;
        assert!((g.max_speed() - expected).abs() < 1e-9);

        g.add_edge(2, 1, 0.0).unwrap();
        assert_eq!(g.max_speed(), f64::INFINITY);
    }
}
