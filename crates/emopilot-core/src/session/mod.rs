//! Session state machine.
//!
//! A [`Session`] owns the game state, the timer registry and the handles to
//! its collaborators (XP store, audio port). Player intents and timer firings
//! are applied one at a time, each to completion.

mod machine;
mod phase;
mod snapshot;

pub use machine::Session;
pub use phase::Phase;
pub use snapshot::SessionSnapshot;
