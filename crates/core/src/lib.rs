pub mod config;
pub mod error;
pub mod integrand;
pub mod interval;

pub use config::{Config, ProblemConfig, SchedulerConfig, Strategy};
pub use error::*;
pub use integrand::Integrand;
pub use interval::Interval;
