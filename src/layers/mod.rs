mod role;
mod set;
pub mod wms;

pub use role::*;
pub use set::*;
pub use wms::{FeatureInfoParams, WmsSource};
