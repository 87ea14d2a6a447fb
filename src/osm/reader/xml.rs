// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use super::model;
use crate::Node;

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Reader streams osm [Features](model::Feature) from an
/// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) document.
///
/// Relations are skipped, together with their members and tags.
/// Invalid nodes, ways, tags and node references are skipped with a warning.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<model::Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut f: Option<model::Feature> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => {
                    self.eof = true;
                    return Some(Err(e));
                }
            };

            match event {
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => {
                        if let Some(n) = parse_node(&start) {
                            return Some(Ok(model::Feature::Node(n)));
                        }
                    }

                    b"tag" => {
                        if let Some(tags) = feature_tags(&mut f) {
                            if let Some((k, v)) = parse_tag(&start) {
                                tags.insert(k, v);
                            }
                        }
                    }

                    b"nd" => {
                        if let Some(nodes) = feature_nodes(&mut f) {
                            if let Some(ref_) = parse_nd(&start) {
                                nodes.push(ref_);
                            }
                        }
                    }

                    // "member", self-closing "way" and "relation" carry nothing routable
                    _ => {}
                },

                Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => f = parse_node(&start).map(model::Feature::Node),
                    b"way" => f = parse_way(&start).map(model::Feature::Way),
                    b"relation" => f = None,
                    // "tag", "nd" and "member" must be self-closing
                    _ => {}
                },

                Event::End(end) => {
                    if let b"node" | b"way" = end.local_name().as_ref() {
                        if let Some(f) = f.take() {
                            return Some(Ok(f));
                        }
                    }
                }

                Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        f.map(Ok)
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

/// Returns the value of an attribute with the provided key, or `None` if the
/// attribute is missing, malformed or not valid UTF-8.
fn get_attribute(start: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    start
        .attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| from_utf8(&attr.value).ok().map(str::to_string))
}

fn warn_invalid(start: &BytesStart<'_>) {
    log::warn!(
        "skipping invalid OSM element: <{}>",
        String::from_utf8_lossy(start)
    );
}

fn parse_node(start: &BytesStart<'_>) -> Option<Node> {
    let id = get_attribute(start, b"id").and_then(|v| v.parse::<i64>().ok());
    let lat = get_attribute(start, b"lat").and_then(|v| v.parse::<f64>().ok());
    let lon = get_attribute(start, b"lon").and_then(|v| v.parse::<f64>().ok());

    match (id, lat, lon) {
        (Some(id), Some(lat), Some(lon))
            if id != 0
                && lat.is_finite()
                && lon.is_finite()
                && lat.abs() <= 90.0
                && lon.abs() <= 180.0 =>
        {
            Some(Node { id, lat, lon })
        }

        _ => {
            warn_invalid(start);
            None
        }
    }
}

fn parse_way(start: &BytesStart<'_>) -> Option<model::Way> {
    match get_attribute(start, b"id").and_then(|v| v.parse::<i64>().ok()) {
        Some(id) if id != 0 => Some(model::Way {
            id,
            nodes: Vec::default(),
            tags: HashMap::default(),
        }),

        _ => {
            warn_invalid(start);
            None
        }
    }
}

fn parse_tag(start: &BytesStart<'_>) -> Option<(String, String)> {
    match get_attribute(start, b"k") {
        Some(k) => Some((k, get_attribute(start, b"v").unwrap_or_default())),
        None => {
            warn_invalid(start);
            None
        }
    }
}

fn parse_nd(start: &BytesStart<'_>) -> Option<i64> {
    match get_attribute(start, b"ref").and_then(|v| v.parse::<i64>().ok()) {
        Some(ref_) if ref_ != 0 => Some(ref_),
        _ => {
            warn_invalid(start);
            None
        }
    }
}

fn feature_tags(f: &mut Option<model::Feature>) -> Option<&mut HashMap<String, String>> {
    match f {
        Some(model::Feature::Way(ref mut w)) => Some(&mut w.tags),
        _ => None,
    }
}

fn feature_nodes(f: &mut Option<model::Feature>) -> Option<&mut Vec<i64>> {
    match f {
        Some(model::Feature::Way(ref mut w)) => Some(&mut w.nodes),
        _ => None,
    }
}
