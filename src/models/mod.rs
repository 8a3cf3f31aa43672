pub mod collection;
pub mod draw;
pub mod feature;
pub mod geo;
pub mod style;

pub use collection::{GeometryCollection, UserFeature};
pub use draw::{
    ComposedMap, Decorations, DrawInstruction, LabelStyle, LegendEntry, LegendSymbol, MapLayer,
    Primitive, StyledGeometry,
};
pub use feature::{FeatureRecord, FeatureTable, RoadEdge, TagValue};
pub use self::geo::{AreaOfInterest, BoundingBox};
pub use style::{Rgb, StyleRule};
