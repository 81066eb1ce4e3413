//! Play-by-play cleaning and timing analysis.

pub mod anomalies;
pub mod density;
pub mod describe;
pub mod durations;
mod error;
pub mod events;
pub mod frame;
pub mod metrics;
pub mod season;
pub mod summary;
pub mod wallclock;

pub use error::{PbpError, Result};
