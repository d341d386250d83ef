mod core;
mod messages;
mod worker;

pub use core::SweepEngine;
pub use messages::{JobRequest, JobResult};
