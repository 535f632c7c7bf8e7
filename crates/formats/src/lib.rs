pub mod geojson;
pub mod loader;
pub mod normalize;
pub mod raw;

pub use geojson::*;
pub use loader::*;
pub use normalize::*;
pub use raw::*;
