pub mod dataset;
pub mod expr;
pub mod picking;
pub mod query;
pub mod selection;
pub mod state;

pub use dataset::*;
