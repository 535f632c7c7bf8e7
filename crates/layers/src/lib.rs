pub mod layer;
pub mod surface;
pub mod tooltip;
pub mod vector;

pub use layer::*;
pub use surface::*;
