use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid bounds: [{left}, {right}] (need finite left < right)")]
    InvalidBounds { left: f64, right: f64 },

    #[error("invalid tolerance: {0} (need finite tol > 0)")]
    InvalidTolerance(f64),

    #[error("invalid queue capacity: {0} (need at least 1)")]
    InvalidCapacity(usize),

    #[error("unknown strategy: {0} (expected fork-join, work-stealing or shared-queue)")]
    UnknownStrategy(String),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
