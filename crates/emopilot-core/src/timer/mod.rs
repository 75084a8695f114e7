mod registry;

pub use registry::{TimerHandle, TimerRegistry};
