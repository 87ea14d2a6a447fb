// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::{earth_distance, Graph, Node};

use super::{model, Options};
use crate::osm::Error;

/// Helper object used for storing state related to converting [OSM features](super::model::Feature)
/// into a [Graph].
///
/// Positions of all OSM nodes are remembered, but nodes are only added to the graph
/// once a routable way references them.
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    options: &'a Options<'a>,
    positions: HashMap<i64, Node>,
    ignore_bbox: bool,
    ways: usize,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new, empty graph builder.
    pub(super) fn new(g: &'a mut Graph, options: &'a Options<'a>) -> Self {
        let all_zero = options.bbox.iter().all(|&x| x == 0.0);
        let any_invalid = options.bbox.iter().any(|x| !x.is_finite());
        if any_invalid && !all_zero {
            log::warn!("ignoring invalid bounding box: {:?}", options.bbox);
        }

        Self {
            g,
            options,
            positions: HashMap::default(),
            ignore_bbox: all_zero || any_invalid,
            ways: 0,
        }
    }

    /// Add all features from the provided iterator, stopping at the first error.
    pub(super) fn add_features<I, E>(&mut self, features: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Result<model::Feature, E>>,
        Error: From<E>,
    {
        let nodes_before = self.g.len();
        let edges_before = self.g.edge_count();

        for f in features {
            self.add_feature(f?)?;
        }

        log::info!(
            "loaded {} routable ways: {} nodes and {} edges added",
            self.ways,
            self.g.len() - nodes_before,
            self.g.edge_count() - edges_before,
        );
        Ok(())
    }

    fn add_feature(&mut self, f: model::Feature) -> Result<(), Error> {
        match f {
            model::Feature::Node(n) => {
                self.add_node(n);
                Ok(())
            }
            model::Feature::Way(w) => self.add_way(w),
        }
    }

    fn add_node(&mut self, n: Node) {
        if self.is_in_bbox(n.lat, n.lon) {
            self.positions.insert(n.id, n);
        }
    }

    fn is_in_bbox(&self, lat: f64, lon: f64) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn add_way(&mut self, w: model::Way) -> Result<(), Error> {
        let speed = self.options.profile.way_speed(&w.tags);
        if speed <= 0.0 {
            return Ok(());
        }

        let nodes = self.get_way_nodes(&w);
        if nodes.is_empty() {
            return Ok(());
        }

        let (forward, backward) = self.options.profile.way_direction(&w.tags);
        if !forward && !backward {
            return Ok(());
        }

        self.create_edges(&nodes, speed, forward, backward)?;
        self.ways += 1;
        Ok(())
    }

    /// Returns the positions of all known nodes of a way. Returns an empty vector
    /// if less than 2 of the way's nodes are known.
    fn get_way_nodes(&self, w: &model::Way) -> Vec<Node> {
        let nodes: Vec<Node> = w
            .nodes
            .iter()
            .filter_map(|node_id| self.positions.get(node_id).copied())
            .collect();

        if nodes.len() < 2 {
            if self.ignore_bbox {
                log::warn!(
                    "way {} references less than 2 known nodes - skipping",
                    w.id
                );
            }
            vec![]
        } else {
            nodes
        }
    }

    /// Connects consecutive way nodes with edges, weighted by the travel time
    /// (in seconds) at the provided speed (in km/h).
    fn create_edges(
        &mut self,
        nodes: &[Node],
        speed: f64,
        forward: bool,
        backward: bool,
    ) -> Result<(), Error> {
        debug_assert!(nodes.len() >= 2);
        debug_assert!(speed.is_finite() && speed > 0.0);

        let meters_per_second = speed / 3.6;

        for pair in nodes.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            if left.id == right.id {
                continue;
            }

            self.g.add_node(left);
            self.g.add_node(right);

            let weight =
                earth_distance(left.lat, left.lon, right.lat, right.lon) / meters_per_second;

            if forward {
                self.g.add_edge(left.id, right.id, weight)?;
            }
            if backward {
                self.g.add_edge(right.id, left.id, weight)?;
            }
        }

        Ok(())
    }
}
