//! Scheduled Jobs: register/list/update/delete cron-like job definitions
//! bound to a tenant, and the cron-equivalent scheduler they're wired into.

mod error;
mod scheduler;
mod service;

pub use error::ScheduledJobError;
pub use scheduler::{CronScheduler, NullCronScheduler, ScheduledTask, TokioCronScheduler};
pub use service::{RegisterScheduledJobRequest, ScheduledJobService, UpdateScheduledJobRequest};
