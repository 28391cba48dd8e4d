//! Tracing targets for the engine components.
//!
//! Use these with `tracing` directives to filter logs by subsystem, for
//! example `lattice_grid::pinning=debug`.

/// Target names for log filtering.
pub mod targets {
    /// Selection registry target.
    pub const SELECTION: &str = "lattice_grid::selection";
    /// Filter/sort/group pipeline target.
    pub const PIPELINE: &str = "lattice_grid::pipeline";
    /// List navigation target.
    pub const NAVIGATION: &str = "lattice_grid::navigation";
    /// Combo and drop-down composition target.
    pub const LIST: &str = "lattice_grid::list";
    /// Column pinning target.
    pub const PINNING: &str = "lattice_grid::pinning";
    /// Column drag-reorder target.
    pub const COLUMN_MOVING: &str = "lattice_grid::column_moving";
    /// Configuration loading target.
    pub const CONFIG: &str = "lattice_grid::config";
}
