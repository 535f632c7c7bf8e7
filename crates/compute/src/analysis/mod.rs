pub mod histogram;
pub mod timeline;

pub use histogram::*;
pub use timeline::*;
