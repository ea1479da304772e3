//! Time-driven lifecycle work.
//!
//! - `SweepRunner`: the three retention sweeps, runnable on demand
//! - `DailyScheduler`: sleeps until the configured local wall-clock time,
//!   runs the sweeps concurrently, repeats

pub mod scheduler;
pub mod sweep;

pub use scheduler::{DailyScheduler, next_run_after};
pub use sweep::{SweepReport, SweepRunner};
