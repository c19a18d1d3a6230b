mod engine;
mod openlayers;
pub mod scale;

pub use engine::*;
pub use openlayers::OlMap;
