//! opttools core library
//!
//! Support tooling for the `opt` optional-value library:
//! - Benchmark source generation (`bench`)
//! - Example-output checking against inline `//$` expectations
//!   (`expectation`, `runner`, `check`)

pub mod bench;
pub mod check;
pub mod error;
pub mod expectation;
pub mod runner;
pub mod telemetry;

pub use bench::{generate_benchmark, render_benchmark, Mode};
pub use check::{compare_lines, run_check, CheckReport, CheckSpec, PairResult, Violation};
pub use error::{OptToolsError, Result};
pub use expectation::{
    load_expectations, parse_expectations, Expectation, ExpectedLine, MARKER,
};
pub use runner::{run_target, TargetRun};
pub use telemetry::init_tracing;

/// opttools version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
