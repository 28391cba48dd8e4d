//! Logging facilities for Lattice Grid.
//!
//! Lattice Grid uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in the host
//! application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lattice_grid::pinning=debug,lattice_grid_core=trace")
//!     .init();
//! ```

/// Span names used for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Performance measurement span.
    pub const PERF: &str = "lattice_grid::perf";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core runtime target.
    pub const CORE: &str = "lattice_grid_core";
    /// Timer system target.
    pub const TIMER: &str = "lattice_grid_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lattice_grid_core::signal";
    /// Widget id generation target.
    pub const ID: &str = "lattice_grid_core::id";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time pipeline passes and other bulk operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: span_names::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }

    /// Create a performance span annotated with the number of items processed.
    pub fn with_len(name: &'static str, len: usize) -> Self {
        let span =
            tracing::info_span!(target: span_names::PERF, "perf", operation = name, len);
        Self {
            span: span.entered(),
        }
    }
}
