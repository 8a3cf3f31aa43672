pub mod area_of_interest;
pub mod crs;
pub mod layer_classifier;
pub mod map_composer;
pub mod map_pipeline;
pub mod overpass;
pub mod provider;
pub mod street_labels;

pub use map_pipeline::MapService;
pub use provider::OsmProvider;
