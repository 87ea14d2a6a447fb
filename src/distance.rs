// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Mean radius of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6_371_008.8;

/// Mean diameter of Earth, in meters.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in meters.
pub fn earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    // Rounding may push h slightly above 1 for antipodal points
    EARTH_DIAMETER * h.sqrt().min(1.0).asin()
}

/// Cheap, axis-aligned estimate of the distance between two lat-lon positions, in meters.
///
/// Returns the shorter of the north-south and the east-west legs, with the east-west
/// leg measured along the pole-most of the two parallels. The north-south leg alone never
/// exceeds the great-circle distance, thus neither does the returned value, which makes
/// it an admissible A* heuristic when divided by the fastest speed in the graph.
pub fn heuristic_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let north_south = (lat2 - lat1).abs().to_radians() * EARTH_RADIUS;

    let pole_most_lat = lat1.abs().max(lat2.abs()).to_radians();
    let east_west = (lon2 - lon1).abs().to_radians() * EARTH_RADIUS * pole_most_lat.cos();

    north_south.min(east_west)
}

/// Calculates the distance between a position and the great circle containing
/// the meridian at `meridian_lon`, in meters.
///
/// Every path from `(lat, lon)` to a point on the other side of the meridian, which does
/// not wrap around the antimeridian, has to cross that great circle. This makes it a
/// lower bound of the distance to such points; wrapping paths are bounded by
/// `meridian_distance(lat, lon, 180.0)` instead.
pub fn meridian_distance(lat: f64, lon: f64, meridian_lon: f64) -> f64 {
    let sin_d = lat.to_radians().cos() * (lon - meridian_lon).to_radians().sin().abs();
    EARTH_RADIUS * sin_d.min(1.0).asin()
}
