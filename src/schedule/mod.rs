//! Scheduling: the poll scheduler and the session it drives.

pub mod scheduler;
pub mod session;

pub use scheduler::PollScheduler;
pub use session::{CycleReport, OverlaySession};
