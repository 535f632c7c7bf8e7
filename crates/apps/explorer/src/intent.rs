use serde::{Deserialize, Serialize};

use scene::state::Quantity;

/// Which end of the year window a slider controls.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Start,
    End,
}

/// A user or surface event, as it enters the explorer.
///
/// `DragRange` is the only live intent: it moves the controls but never the
/// filter state. `Play` and `Pause` drive the scheduler. Everything else is a
/// committed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    DragRange { handle: Handle, value: f64 },
    /// Commits the current slider positions.
    ReleaseRange,
    /// Commits both text inputs together.
    CommitText { start: String, end: String },
    ToggleEf { ef: u8, checked: bool },
    SelectState { value: String },
    SelectBracket { quantity: Quantity, value: String },
    TimelineClick { year: i32 },
    Play,
    Pause,
}
