use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::interval::{validate_bounds, validate_tolerance};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Strategy ──────────────────────────────────────────────────

/// Which scheduler drives the subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Recursive spawn/join on a rayon pool.
    ForkJoin,
    /// One queue per worker, idle workers steal round-robin.
    WorkStealing,
    /// One queue and one lock shared by every worker.
    SharedQueue,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::ForkJoin, Strategy::WorkStealing, Strategy::SharedQueue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ForkJoin => "fork-join",
            Strategy::WorkStealing => "work-stealing",
            Strategy::SharedQueue => "shared-queue",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fork-join" | "forkjoin" => Ok(Strategy::ForkJoin),
            "work-stealing" | "stealing" => Ok(Strategy::WorkStealing),
            "shared-queue" | "shared" => Ok(Strategy::SharedQueue),
            _ => Err(CoreError::UnknownStrategy(s.to_string())),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub problem: ProblemConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `QUAD_PROFILE` env var. When set (e.g. `BENCH`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("QUAD_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            problem: ProblemConfig::from_env_profiled(p),
            scheduler: SchedulerConfig::from_env_profiled(p),
        }
    }

    /// Load a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(content)?)
    }

    /// Check the run parameters before any worker starts.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_bounds(self.problem.left, self.problem.right)?;
        validate_tolerance(self.problem.tol)?;
        if self.scheduler.queue_capacity == 0 {
            return Err(CoreError::InvalidCapacity(0));
        }
        Ok(())
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  problem:    integrand={}, bounds=[{}, {}], tol={:e}",
            self.problem.integrand,
            self.problem.left,
            self.problem.right,
            self.problem.tol
        );
        tracing::info!(
            "  scheduler:  strategy={}, workers={}, queue_capacity={}",
            self.scheduler.strategy,
            self.scheduler.resolved_worker_threads(),
            self.scheduler.queue_capacity
        );
    }
}

// ── Section configs ───────────────────────────────────────────

/// What to integrate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    /// Name of a catalog integrand.
    #[serde(default = "default_integrand")]
    pub integrand: String,
    #[serde(default = "default_left")]
    pub left: f64,
    #[serde(default = "default_right")]
    pub right: f64,
    /// Absolute acceptance tolerance for every sub-interval.
    #[serde(default = "default_tol")]
    pub tol: f64,
}

fn default_integrand() -> String { "sin".to_string() }
fn default_left() -> f64 { 0.0 }
fn default_right() -> f64 { 10.0 }
fn default_tol() -> f64 { 1e-6 }

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            integrand: default_integrand(),
            left: default_left(),
            right: default_right(),
            tol: default_tol(),
        }
    }
}

impl ProblemConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            integrand: profiled_env_or(p, "QUAD_INTEGRAND", &default_integrand()),
            left: profiled_env_parse(p, "QUAD_LEFT", default_left()),
            right: profiled_env_parse(p, "QUAD_RIGHT", default_right()),
            tol: profiled_env_parse(p, "QUAD_TOL", default_tol()),
        }
    }
}

/// How to schedule the subdivision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    /// Number of worker threads. 0 = available parallelism.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Fixed capacity of every task queue. Exceeding it aborts the run.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_strategy() -> Strategy { Strategy::WorkStealing }
fn default_worker_threads() -> usize { 0 }
fn default_queue_capacity() -> usize { 10_000 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            worker_threads: default_worker_threads(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SchedulerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            strategy: profiled_env_parse(p, "QUAD_STRATEGY", default_strategy()),
            worker_threads: profiled_env_parse(p, "QUAD_WORKERS", default_worker_threads()),
            queue_capacity: profiled_env_parse(p, "QUAD_QUEUE_CAPACITY", default_queue_capacity()),
        }
    }

    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let config = Config::default();
        assert_eq!(config.problem.integrand, "sin");
        assert_eq!(config.problem.left, 0.0);
        assert_eq!(config.problem.right, 10.0);
        assert_eq!(config.problem.tol, 1e-6);
        assert_eq!(config.scheduler.strategy, Strategy::WorkStealing);
        assert_eq!(config.scheduler.worker_threads, 0);
        assert_eq!(config.scheduler.queue_capacity, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolved_worker_threads() {
        let mut config = SchedulerConfig::default();
        // 0 means auto-detect
        assert!(config.resolved_worker_threads() > 0);

        config.worker_threads = 8;
        assert_eq!(config.resolved_worker_threads(), 8);
    }

    #[test]
    fn strategy_parses_kebab_and_aliases() {
        assert_eq!("fork-join".parse::<Strategy>().unwrap(), Strategy::ForkJoin);
        assert_eq!("Work_Stealing".parse::<Strategy>().unwrap(), Strategy::WorkStealing);
        assert_eq!("shared".parse::<Strategy>().unwrap(), Strategy::SharedQueue);
        assert!(matches!(
            "round-robin".parse::<Strategy>(),
            Err(CoreError::UnknownStrategy(_))
        ));
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [problem]
            integrand = "square"
            right = 1.0

            [scheduler]
            strategy = "shared-queue"
            worker_threads = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.problem.integrand, "square");
        assert_eq!(config.problem.left, 0.0);
        assert_eq!(config.problem.right, 1.0);
        assert_eq!(config.problem.tol, 1e-6);
        assert_eq!(config.scheduler.strategy, Strategy::SharedQueue);
        assert_eq!(config.scheduler.worker_threads, 4);
        assert_eq!(config.scheduler.queue_capacity, 10_000);
    }

    #[test]
    fn bad_strategy_in_toml_is_a_parse_error() {
        let result = Config::from_toml("[scheduler]\nstrategy = \"lottery\"\n");
        assert!(matches!(result, Err(CoreError::ConfigParse(_))));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[problem]\ntol = 1e-9\n[scheduler]\nqueue_capacity = 64").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.problem.tol, 1e-9);
        assert_eq!(config.scheduler.queue_capacity, 64);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CoreError::ConfigIo(_))));
    }

    #[test]
    fn profile_prefixed_keys_win() {
        // Unique profile name so parallel tests never see these keys.
        env::set_var("CFGTESTA_QUAD_TOL", "0.5");
        env::set_var("CFGTESTA_QUAD_STRATEGY", "fork-join");
        env::set_var("CFGTESTA_QUAD_WORKERS", "not-a-number");

        let config = Config::for_profile("cfgtesta");
        assert_eq!(config.profile, "CFGTESTA");
        assert_eq!(config.profile_label(), "CFGTESTA");
        assert_eq!(config.problem.tol, 0.5);
        assert_eq!(config.scheduler.strategy, Strategy::ForkJoin);
        // Unparseable values fall back to defaults.
        assert_eq!(config.scheduler.worker_threads, 0);

        env::remove_var("CFGTESTA_QUAD_TOL");
        env::remove_var("CFGTESTA_QUAD_STRATEGY");
        env::remove_var("CFGTESTA_QUAD_WORKERS");
    }

    #[test]
    fn validate_rejects_bad_runs() {
        let mut config = Config::default();
        config.problem.left = 5.0;
        config.problem.right = 5.0;
        assert!(matches!(config.validate(), Err(CoreError::InvalidBounds { .. })));

        let mut config = Config::default();
        config.problem.tol = -1.0;
        assert!(matches!(config.validate(), Err(CoreError::InvalidTolerance(_))));

        let mut config = Config::default();
        config.scheduler.queue_capacity = 0;
        assert!(matches!(config.validate(), Err(CoreError::InvalidCapacity(0))));
    }
}
