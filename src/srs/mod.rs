pub mod scheduler;

pub use scheduler::{ReviewOutcome, Scheduler, SchedulerParams};
