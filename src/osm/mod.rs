// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Conversion of [OpenStreetMap](https://www.openstreetmap.org/) data into a routing [Graph](crate::Graph).

mod profile;
mod reader;

pub use profile::{parse_maxspeed, Profile, Speed, CAR_PROFILE, FOOT_PROFILE};
pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io, FileFormat, Options,
};

/// Error conditions which may occur when loading OSM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Graph(#[from] crate::GraphError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{earth_distance, Algorithm, Graph, RouteRequest, Router};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-6),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    macro_rules! assert_edge {
        ($graph:expr, $from:expr, $to:expr) => {
            assert!($graph.get_edge($from, $to).is_finite());
        };
    }

    macro_rules! assert_no_edge {
        ($graph:expr, $from:expr, $to:expr) => {
            assert!($graph.get_edge($from, $to).is_infinite());
        };
    }

    const SIMPLE_XML: &[u8] = include_bytes!("reader/test_fixtures/simple.osm");
    const SIMPLE_XML_GZ: &[u8] = include_bytes!("reader/test_fixtures/simple.osm.gz");
    const SIMPLE_XML_BZ2: &[u8] = include_bytes!("reader/test_fixtures/simple.osm.bz2");

    fn load(data: &[u8], profile: &Profile<'_>, file_format: FileFormat, bbox: [f64; 4]) -> Graph {
        let mut g = Graph::default();
        let options = Options {
            profile,
            file_format,
            bbox,
        };
        add_features_from_buffer(&mut g, &options, data).unwrap();
        g
    }

    fn check_simple_graph(g: &Graph) {
        //       7
        //       ┆ (footway)
        // 5─────4
        // │     ↑ (oneway)
        // 1──2──3┄┄8 (private)

        assert_eq!(g.len(), 5);
        assert_eq!(g.edge_count(), 9);
        for id in [-6, -7, -8, -10, -99] {
            assert!(g.get_node(id).is_none(), "node {id} should not be loaded");
        }

        // Check edge costs: primary at 60 km/h, residential at 20 km/h and maxspeed=40
        assert_almost_eq!(
            g.get_edge(-1, -2),
            earth_distance(0.0, 0.0, 0.0, 0.001) / (60.0 / 3.6)
        );
        assert_eq!(g.get_edge(-1, -2), g.get_edge(-2, -1));
        assert_almost_eq!(
            g.get_edge(-3, -4),
            earth_distance(0.0, 0.002, 0.001, 0.002) / (20.0 / 3.6)
        );
        assert_almost_eq!(
            g.get_edge(-4, -5),
            earth_distance(0.001, 0.002, 0.001, 0.0) / (40.0 / 3.6)
        );

        // Check oneway handling
        assert_edge!(g, -3, -4);
        assert_no_edge!(g, -4, -3);

        // Check untraversable ways: building, footway and access=private
        assert_no_edge!(g, -5, -6);
        assert_no_edge!(g, -4, -7);
        assert_no_edge!(g, -3, -8);
    }

    #[test]
    fn test_build_graph_xml() {
        check_simple_graph(&load(SIMPLE_XML, &CAR_PROFILE, FileFormat::Xml, [0.0; 4]));
    }

    #[test]
    fn test_build_graph_gz() {
        check_simple_graph(&load(SIMPLE_XML_GZ, &CAR_PROFILE, FileFormat::XmlGz, [0.0; 4]));
    }

    #[test]
    fn test_build_graph_bz2() {
        check_simple_graph(&load(SIMPLE_XML_BZ2, &CAR_PROFILE, FileFormat::XmlBz2, [0.0; 4]));
    }

    #[test]
    fn test_build_graph_detect_format() {
        for data in [SIMPLE_XML, SIMPLE_XML_GZ, SIMPLE_XML_BZ2] {
            check_simple_graph(&load(data, &CAR_PROFILE, FileFormat::Unknown, [0.0; 4]));
        }
    }

    #[test]
    fn test_build_graph_io() {
        let mut g = Graph::default();
        let options = Options {
            profile: &CAR_PROFILE,
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
        };
        add_features_from_io(&mut g, &options, std::io::Cursor::new(SIMPLE_XML_GZ)).unwrap();
        check_simple_graph(&g);
    }

    #[test]
    fn test_build_graph_foot() {
        let g = load(SIMPLE_XML, &FOOT_PROFILE, FileFormat::Xml, [0.0; 4]);
        assert_eq!(g.len(), 6);
        assert_eq!(g.edge_count(), 12);
        assert_edge!(g, -4, -3);
        assert_edge!(g, -4, -7);
        assert_no_edge!(g, -3, -8);
        assert_almost_eq!(
            g.get_edge(-1, -2),
            earth_distance(0.0, 0.0, 0.0, 0.001) / (5.0 / 3.6)
        );
    }

    #[test]
    fn test_build_graph_bbox() {
        let g = load(
            SIMPLE_XML,
            &CAR_PROFILE,
            FileFormat::Xml,
            [-0.0005, -0.0005, 0.0025, 0.0005],
        );
        assert_eq!(g.len(), 3);
        assert_eq!(g.edge_count(), 4);
        assert_edge!(g, -1, -2);
        assert_edge!(g, -3, -2);
    }

    #[test]
    fn test_invalid_bbox_is_ignored() {
        let g = load(
            SIMPLE_XML,
            &CAR_PROFILE,
            FileFormat::Xml,
            [f64::NAN, 0.0, 1.0, 1.0],
        );
        check_simple_graph(&g);
    }

    #[test]
    fn test_route_over_loaded_graph() {
        let router = Router::new(load(SIMPLE_XML, &CAR_PROFILE, FileFormat::Xml, [0.0; 4]));
        for algorithm in Algorithm::ALL {
            let response = router
                .route(&RouteRequest {
                    start: (0.0011, 0.0021),
                    end: (-0.0001, 0.0021),
                    algorithm,
                })
                .unwrap();
            assert_eq!(response.path, vec![-4, -5, -1, -2, -3]);
        }
    }

    #[test]
    fn test_missing_file() {
        let mut g = Graph::default();
        let options = Options {
            profile: &CAR_PROFILE,
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
        };
        let result = add_features_from_file(&mut g, &options, "this/file/does/not/exist.osm");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_malformed_xml() {
        let mut g = Graph::default();
        let options = Options {
            profile: &CAR_PROFILE,
            file_format: FileFormat::Xml,
            bbox: [0.0; 4],
        };
        let result =
            add_features_from_buffer(&mut g, &options, b"<osm><way id=\"1\"></node></osm>");
        assert!(matches!(result, Err(Error::Xml(_))));
    }
}
