//! Scroll-intent state machine for the expanding media stage.
//!
//! [`GestureEngine`] folds wheel, touch, scroll, and resize input into one
//! normalized expansion progress value with hysteresis on content reveal.
//! [`InputPort`] gates delivery behind an explicit attach/detach lifecycle,
//! and [`media_layout`] derives stage geometry from progress.

mod engine;
mod geometry;
mod port;

pub use engine::{EventOutcome, GestureEngine, GesturePhase, InputEvent, Subject};
pub use geometry::{media_layout, MediaLayout};
pub use port::{InputPort, PortError};
