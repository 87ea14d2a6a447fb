use std::error::Error;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use routefinder::{Algorithm, RouteRequest, Router};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] routefinder::osm::Error);

#[derive(Debug, thiserror::Error)]
#[error("no route between ({0}, {1}) and ({2}, {3})")]
struct NoRouteError(f64, f64, f64, f64);

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Routing profile used to interpret the OSM file
    #[arg(long, value_enum, default_value_t = ProfileName::Car, global = true)]
    profile: ProfileName,

    /// Maximum number of nodes expanded by a single search
    #[arg(long, default_value_t = routefinder::DEFAULT_STEP_LIMIT, global = true)]
    step_limit: usize,

    /// Log more details (may be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Find the fastest route between two positions and print it as GeoJSON
    Route {
        /// The path to the OSM file
        osm_file: PathBuf,

        /// Latitude of the start point
        #[arg(allow_negative_numbers = true)]
        start_lat: f64,

        /// Longitude of the start point
        #[arg(allow_negative_numbers = true)]
        start_lon: f64,

        /// Latitude of the end point
        #[arg(allow_negative_numbers = true)]
        end_lat: f64,

        /// Longitude of the end point
        #[arg(allow_negative_numbers = true)]
        end_lon: f64,

        /// Search algorithm: dijkstra, a-star or bidirectional-a-star
        #[arg(short, long, default_value_t = Algorithm::default())]
        algorithm: Algorithm,
    },

    /// Answer route requests over HTTP
    Serve {
        /// The path to the OSM file
        osm_file: PathBuf,

        /// Address to listen on
        #[arg(short, long, default_value = routefinder::server::DEFAULT_BIND_ADDRESS)]
        bind: SocketAddr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileName {
    Car,
    Foot,
}

impl ProfileName {
    fn profile(self) -> &'static routefinder::osm::Profile<'static> {
        match self {
            Self::Car => &routefinder::osm::CAR_PROFILE,
            Self::Foot => &routefinder::osm::FOOT_PROFILE,
        }
    }
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    colog::default_builder()
        .filter_level(match (cli.quiet, cli.verbose) {
            (true, _) => log::LevelFilter::Error,
            (false, 0) => log::LevelFilter::Info,
            (false, 1) => log::LevelFilter::Debug,
            (false, _) => log::LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Route {
            osm_file,
            start_lat,
            start_lon,
            end_lat,
            end_lon,
            algorithm,
        } => {
            let router = load_router(&osm_file, cli.profile, cli.step_limit)?;
            let response = router.route(&RouteRequest {
                start: (start_lat, start_lon),
                end: (end_lat, end_lon),
                algorithm,
            })?;

            if response.path.is_empty() {
                return Err(NoRouteError(start_lat, start_lon, end_lat, end_lon).into());
            }

            let coordinates: Vec<[f64; 2]> = response
                .path
                .iter()
                .filter_map(|&node_id| router.graph().get_node(node_id))
                .map(|node| [node.lon, node.lat])
                .collect();

            let geojson = serde_json::json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {
                            "algorithm": algorithm.name(),
                            "cost": response.cost,
                            "nodes": response.path,
                        },
                        "geometry": {
                            "type": "LineString",
                            "coordinates": coordinates,
                        },
                    },
                ],
            });
            println!("{}", serde_json::to_string_pretty(&geojson)?);
        }

        Command::Serve { osm_file, bind } => {
            let router = load_router(&osm_file, cli.profile, cli.step_limit)?;
            routefinder::server::serve(router, bind).await?;
        }
    }

    Ok(())
}

fn load_router<P: AsRef<Path>>(
    path: P,
    profile: ProfileName,
    step_limit: usize,
) -> Result<Router, GraphLoadError> {
    let started = std::time::Instant::now();
    let g = load_graph(path.as_ref(), profile)?;
    log::info!(
        "loaded {} in {:.2} s",
        path.as_ref().display(),
        started.elapsed().as_secs_f64(),
    );
    Ok(Router::new(g).with_step_limit(step_limit))
}

fn load_graph<P: AsRef<Path>>(
    path: P,
    profile: ProfileName,
) -> Result<routefinder::Graph, GraphLoadError> {
    let mut g = routefinder::Graph::default();
    let options = routefinder::osm::Options {
        profile: profile.profile(),
        file_format: routefinder::osm::FileFormat::Unknown,
        bbox: [0.0; 4],
    };
    match routefinder::osm::add_features_from_file(&mut g, &options, path.as_ref()) {
        Ok(()) => Ok(g),
        Err(e) => Err(GraphLoadError(PathBuf::from(path.as_ref()), e)),
    }
}
