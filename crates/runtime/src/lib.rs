pub mod event_bus;
pub mod metrics;
pub mod playback;

pub use event_bus::*;
pub use playback::*;
