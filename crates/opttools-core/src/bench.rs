//! Benchmark source generation for optional-value wrappers.
//!
//! Emits a synthetic translation unit that declares N trivial structs
//! and N wrapped values, used to measure how compile time scales with
//! the number of distinct `opt::option`/`std::optional` instantiations.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{OptToolsError, Result};

/// Optional-value implementations a benchmark can target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// `opt::option` from the opt library.
    OptOption,

    /// The standard library's `std::optional`.
    StdOptional,
}

impl Mode {
    /// The mode key as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::OptOption => "opt::option",
            Mode::StdOptional => "std::optional",
        }
    }

    /// Include directive emitted as the first line of the benchmark.
    pub fn prologue(&self) -> &'static str {
        match self {
            Mode::OptOption => "#include <opt/option.hpp>",
            Mode::StdOptional => "#include <optional>",
        }
    }

    /// Class template the generated values are wrapped in.
    pub fn class_name(&self) -> &'static str {
        self.name()
    }
}

impl FromStr for Mode {
    type Err = OptToolsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "opt::option" => Ok(Mode::OptOption),
            "std::optional" => Ok(Mode::StdOptional),
            other => Err(OptToolsError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Render the benchmark translation unit for `mode`.
///
/// One prologue line, then a struct declaration and a wrapped-value
/// declaration per iteration. Iteration counts at or below zero yield
/// only the prologue.
pub fn render_benchmark(mode: Mode, iterations: i64) -> String {
    let mut out = String::new();
    out.push_str(mode.prologue());
    out.push('\n');

    for i in 0..iterations.max(0) {
        out.push_str(&format!("struct S{i} {{ int x; }};\n"));
        out.push_str(&format!("{}<S{i}> b{i};\n", mode.class_name()));
    }

    out
}

/// Render and write the benchmark source, overwriting `output_path`
/// unconditionally. Filesystem errors propagate.
pub fn generate_benchmark(mode: Mode, output_path: &Path, iterations: i64) -> Result<()> {
    let source = render_benchmark(mode, iterations);
    std::fs::write(output_path, source)?;

    info!(
        mode = %mode.name(),
        path = %output_path.display(),
        iterations,
        "benchmark source written"
    );

    Ok(())
}
