pub mod config;
pub mod controls;
pub mod explorer;
pub mod intent;
pub mod reducer;
pub mod script;
pub mod session;
pub mod timer;

pub use explorer::*;
pub use intent::*;
