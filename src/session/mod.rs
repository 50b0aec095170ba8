//! Practice sessions: the controller state machine and what it shows.

pub mod clock;
pub mod controller;
pub mod feedback;
pub mod practice;
pub mod timers;
pub mod view;

use thiserror::Error;

use crate::content::ContentError;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Controller, ControllerOptions, Timing};
pub use practice::{PracticeSession, open};
pub use view::{PracticeEvent, PracticeView};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a practice session needs at least one item")]
    Empty,
    #[error("practice item {index} is malformed")]
    InvalidItem {
        index: usize,
        #[source]
        source: ContentError,
    },
}
