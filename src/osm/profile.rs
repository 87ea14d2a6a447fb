// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes how to convert OSM data into a [Graph](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the routing profile,
    /// customary the most specific [access tag](https://wiki.openstreetmap.org/wiki/Key:access).
    ///
    /// This value is not used for actual OSM data interpretation, except when set to "foot",
    /// which makes generic `oneway` tags ignored - only `oneway:foot` tags are considered.
    pub name: &'a str,

    /// Array of tags which describe how fast OSM ways can be traversed.
    ///
    /// A way is matched against all [Speed] objects in order, and the first exact
    /// key and value match determines the speed. A matched speed of zero makes the way
    /// unusable for routing.
    pub speeds: &'a [Speed<'a>],

    /// Speed (in km/h) of ways with a `highway` tag which don't match any of [Profile::speeds].
    /// If zero, such ways are not used for routing.
    pub default_speed: f64,

    /// Whether the [maxspeed](https://wiki.openstreetmap.org/wiki/Key:maxspeed) tag
    /// overrides [Profile::speeds] on ways which are otherwise routable.
    pub use_maxspeed: bool,

    /// Array of OSM [access tags](https://wiki.openstreetmap.org/wiki/Key:access#Land-based_transportation)
    /// (in order from least to most specific) to consider when checking for road prohibitions.
    /// Also used to find mode-specific one-way tags (see [Profile::way_direction]).
    pub access: &'a [&'a str],
}

/// Travel speed over OSM ways with specific keys and values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speed<'a> {
    /// Key of an OSM way for which this Speed applies,
    /// used for [Speed::value] comparison (e.g. "highway")
    pub key: &'a str,

    /// Value under [Speed::key] of an OSM way for which this Speed applies.
    /// E.g. "motorway" or "residential".
    pub value: &'a str,

    /// Travel speed, in kilometers per hour. Must be finite and not negative.
    pub speed: f64,
}

const MPH_TO_KMH: f64 = 1.609344;

impl<'a> Profile<'a> {
    /// Finds the travel speed (in km/h) over a way with given tags.
    /// Returns zero if the way can't be used for routing.
    pub fn way_speed(&self, tags: &HashMap<String, String>) -> f64 {
        let speed = self.get_base_speed(tags);
        if !speed.is_normal() || speed < 0.0 || !self.is_allowed(tags) {
            return 0.0;
        }

        if self.use_maxspeed {
            if let Some(value) = tags.get("maxspeed") {
                match parse_maxspeed(value) {
                    Some(max_speed) => return max_speed,
                    None => log::debug!("unrecognized maxspeed {value:?} - using {speed} km/h"),
                }
            }
        }

        speed
    }

    /// Returns the first matching speed from way tags, falling back to
    /// [Profile::default_speed] for other highways, and to zero otherwise.
    fn get_base_speed(&self, tags: &HashMap<String, String>) -> f64 {
        self.speeds
            .iter()
            .find_map(|s| {
                if tags.get(s.key).map(|v| v.as_str()) == Some(s.value) {
                    Some(s.speed)
                } else {
                    None
                }
            })
            .unwrap_or_else(|| {
                if tags.contains_key("highway") {
                    self.default_speed
                } else {
                    0.0
                }
            })
    }

    /// Checks if the way is routable by considering the access tags ([Profile::access]).
    pub fn is_allowed(&self, tags: &HashMap<String, String>) -> bool {
        !matches!(
            self.access
                .iter()
                .rev()
                .find_map(|&mode| tags.get(mode).map(|v| v.as_str())),
            Some("no") | Some("private")
        )
    }

    /// Checks if a way is traversable forward (first return value) and
    /// backwards (second return value) by investigating mode-specific and generic one-way tags.
    ///
    /// Some ways (highway=motorway, highway=motorway_link, junction=roundabout and
    /// junction=circular) default to being one-way, except if overridden by specific tags.
    pub fn way_direction(&self, tags: &HashMap<String, String>) -> (bool, bool) {
        let mut forward = true;
        let mut backward = true;

        // Default one-way ways (foot profile exception - does not apply)
        if !self.apply_foot_exceptions() {
            if let Some("motorway" | "motorway_link") = tags.get("highway").map(|s| s.as_str()) {
                backward = false;
            }

            if let Some("roundabout" | "circular") = tags.get("junction").map(|s| s.as_str()) {
                backward = false;
            }
        }

        // Check the oneway tag
        match self.get_active_oneway_value(tags) {
            "yes" | "true" | "1" => {
                forward = true;
                backward = false;
            }

            "-1" | "reverse" => {
                forward = false;
                backward = true;
            }

            "no" => {
                forward = true;
                backward = true;
            }

            _ => {}
        }

        (forward, backward)
    }

    /// Returns the value of the most specific "oneway:MODE" tag (based on [Profile::access]),
    /// falling back to simply "oneway", and returning an empty string if no relevant tag was found.
    fn get_active_oneway_value<'t>(&self, tags: &'t HashMap<String, String>) -> &'t str {
        if self.apply_foot_exceptions() {
            return tags.get("oneway:foot").map_or("", |v| v.as_str());
        }

        self.access
            .iter()
            .rev()
            .filter(|&&mode| mode != "access")
            .find_map(|&mode| tags.get(&format!("oneway:{mode}")))
            .or_else(|| tags.get("oneway"))
            .map_or("", |v| v.as_str())
    }

    fn apply_foot_exceptions(&self) -> bool {
        self.name == "foot"
    }
}

/// Parses the value of a [maxspeed](https://wiki.openstreetmap.org/wiki/Key:maxspeed) tag
/// into kilometers per hour. Only plain numbers (km/h) and numbers followed by "mph"
/// are understood; other values (like "none", "signals" or "RU:urban") return `None`.
pub fn parse_maxspeed(value: &str) -> Option<f64> {
    let value = value.trim();
    let (number, multiplier) = match value.strip_suffix("mph") {
        Some(number) => (number.trim_end(), MPH_TO_KMH),
        None => (value, 1.0),
    };

    let speed = number.parse::<f64>().ok()? * multiplier;
    if speed.is_normal() && speed > 0.0 {
        Some(speed)
    } else {
        None
    }
}

/// Routing [Profile] for cars, with a typical speed for every road class
/// and with appropriate [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
/// Ways with an unknown `highway` value are driven at 30 km/h.
pub const CAR_PROFILE: Profile = Profile {
    name: "motorcar",
    speeds: &[
        Speed {
            key: "highway",
            value: "motorway",
            speed: 120.0,
        },
        Speed {
            key: "highway",
            value: "trunk",
            speed: 100.0,
        },
        Speed {
            key: "highway",
            value: "motorway_junction",
            speed: 100.0,
        },
        Speed {
            key: "highway",
            value: "primary",
            speed: 60.0,
        },
        Speed {
            key: "highway",
            value: "secondary",
            speed: 40.0,
        },
        Speed {
            key: "highway",
            value: "tertiary",
            speed: 30.0,
        },
        Speed {
            key: "highway",
            value: "unclassified",
            speed: 20.0,
        },
        Speed {
            key: "highway",
            value: "residential",
            speed: 20.0,
        },
        Speed {
            key: "highway",
            value: "service",
            speed: 20.0,
        },
        Speed {
            key: "highway",
            value: "footway",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "path",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "steps",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "pedestrian",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "cycleway",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "bridleway",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "construction",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "proposed",
            speed: 0.0,
        },
    ],
    default_speed: 30.0,
    use_maxspeed: true,
    access: &["access", "vehicle", "motor_vehicle", "motorcar"],
};

/// Routing [Profile] for pedestrians, walking at 5 km/h over all ways
/// except for motorways and trunk roads.
pub const FOOT_PROFILE: Profile = Profile {
    name: "foot",
    speeds: &[
        Speed {
            key: "highway",
            value: "motorway",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "motorway_link",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "trunk",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "trunk_link",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "construction",
            speed: 0.0,
        },
        Speed {
            key: "highway",
            value: "proposed",
            speed: 0.0,
        },
    ],
    default_speed: 5.0,
    use_maxspeed: false,
    access: &["access", "foot"],
};
