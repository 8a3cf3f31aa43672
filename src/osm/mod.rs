//! OSM tag taxonomy for the contextual map layers.
//!
//! Maps each thematic layer to the tag filter used to fetch it and to the
//! static style its features are drawn with, and defines the ordered road
//! class table used for street styling and labelling.

use std::fmt;

use crate::models::{Rgb, StyleRule};

/// Contextual area layers, in the order they are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Buildings,
    Water,
    GreenSpace,
    Roads,
}

impl LayerKind {
    pub const AREA_LAYERS: [LayerKind; 3] =
        [LayerKind::Buildings, LayerKind::Water, LayerKind::GreenSpace];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Buildings => "buildings",
            LayerKind::Water => "water",
            LayerKind::GreenSpace => "green space",
            LayerKind::Roads => "roads",
        }
    }

    /// Tag filter for the feature query. Clauses are OR-ed.
    pub fn tag_filter(&self) -> TagFilter {
        match self {
            LayerKind::Buildings => TagFilter::new(vec![("building", TagMatch::Any)]),
            LayerKind::Water => TagFilter::new(vec![
                ("natural", TagMatch::OneOf(&["water", "waterway"])),
                ("waterway", TagMatch::Any),
            ]),
            LayerKind::GreenSpace => TagFilter::new(vec![
                ("leisure", TagMatch::OneOf(&["park", "garden"])),
                (
                    "landuse",
                    TagMatch::OneOf(&["grass", "forest", "recreation_ground"]),
                ),
            ]),
            LayerKind::Roads => TagFilter::new(vec![("highway", TagMatch::Any)]),
        }
    }

    /// Style for polygonal features of this layer. Roads are styled per
    /// class instead, see [`RoadClass::style`].
    pub fn area_style(&self) -> Option<StyleRule> {
        match self {
            LayerKind::Buildings => Some(StyleRule::area(
                Rgb::new(0xcf, 0xbb, 0xab),
                Rgb::new(0x99, 0x99, 0x99),
                0.3,
                0.7,
                2,
            )),
            LayerKind::Water => Some(StyleRule::area(
                Rgb::new(0xaa, 0xd3, 0xdf),
                Rgb::new(0x6b, 0xa3, 0xb8),
                0.5,
                0.7,
                1,
            )),
            LayerKind::GreenSpace => Some(StyleRule::area(
                Rgb::new(0xc8, 0xe6, 0xc9),
                Rgb::new(0x81, 0xc7, 0x84),
                0.3,
                0.5,
                1,
            )),
            LayerKind::Roads => None,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    /// Key present with any value
    Any,
    /// Key present with one of the listed values
    OneOf(&'static [&'static str]),
}

/// A disjunction of `key` / value-match clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub clauses: Vec<(&'static str, TagMatch)>,
}

impl TagFilter {
    pub fn new(clauses: Vec<(&'static str, TagMatch)>) -> Self {
        TagFilter { clauses }
    }

    /// True when any clause matches the given tag lookup.
    pub fn matches<'a>(&self, lookup: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.clauses.iter().any(|(key, matcher)| match (lookup(key), matcher) {
            (Some(_), TagMatch::Any) => true,
            (Some(value), TagMatch::OneOf(values)) => values.contains(&value),
            (None, _) => false,
        })
    }
}

/// Road classes in drawing priority order. Classification is by
/// case-insensitive substring of the `highway` tag, so one edge may match
/// several classes and is then drawn once per match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Footway,
    Path,
}

impl RoadClass {
    pub const ORDERED: [RoadClass; 9] = [
        RoadClass::Motorway,
        RoadClass::Trunk,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Residential,
        RoadClass::Service,
        RoadClass::Footway,
        RoadClass::Path,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            RoadClass::Motorway => "motorway",
            RoadClass::Trunk => "trunk",
            RoadClass::Primary => "primary",
            RoadClass::Secondary => "secondary",
            RoadClass::Tertiary => "tertiary",
            RoadClass::Residential => "residential",
            RoadClass::Service => "service",
            RoadClass::Footway => "footway",
            RoadClass::Path => "path",
        }
    }

    pub fn style(&self) -> StyleRule {
        let white = Rgb::WHITE;
        let pale = Rgb::new(0xf0, 0xf0, 0xf0);
        match self {
            RoadClass::Motorway => StyleRule::line(Rgb::new(0xe8, 0x92, 0x6b), 4.0, 1.0, 7),
            RoadClass::Trunk => StyleRule::line(Rgb::new(0xf9, 0xb3, 0x80), 3.0, 1.0, 6),
            RoadClass::Primary => StyleRule::line(Rgb::new(0xfc, 0xd6, 0xa4), 2.5, 1.0, 5),
            RoadClass::Secondary => StyleRule::line(white, 2.0, 1.0, 4),
            RoadClass::Tertiary => StyleRule::line(white, 1.5, 1.0, 4),
            RoadClass::Residential => StyleRule::line(white, 1.2, 0.9, 3),
            RoadClass::Service => StyleRule::line(white, 0.8, 0.8, 3),
            RoadClass::Footway => StyleRule::line(pale, 0.5, 0.6, 2),
            RoadClass::Path => StyleRule::line(pale, 0.5, 0.6, 2),
        }
    }

    /// Whether streets of this class receive a name label.
    pub fn is_labeled(&self) -> bool {
        LABELED_ROAD_CLASSES.contains(self)
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Classes whose named edges are eligible for a street label. Footways,
/// paths and service roads are never labelled.
pub const LABELED_ROAD_CLASSES: [RoadClass; 5] = [
    RoadClass::Primary,
    RoadClass::Secondary,
    RoadClass::Tertiary,
    RoadClass::Residential,
    RoadClass::Trunk,
];
