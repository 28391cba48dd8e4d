//! Core runtime for Lattice Grid.
//!
//! This crate provides the framework-independent plumbing shared by the
//! Lattice Grid engine components:
//!
//! - **Signal/Slot System**: Synchronous change notification
//! - **Timers**: Host-owned repeating timers used for drag auto-scroll
//! - **Id Generation**: Process-wide, host-owned widget instance ids
//! - **Logging**: `tracing` targets and helpers
//!
//! # Signal/Slot Example
//!
//! ```
//! use lattice_grid_core::Signal;
//!
//! let pinned = Signal::<String>::new();
//!
//! let conn_id = pinned.connect(|field| {
//!     println!("pinned column: {}", field);
//! });
//!
//! pinned.emit("price".to_string());
//! pinned.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use lattice_grid_core::{IntervalTimer, TimerManager};
//!
//! let mut timers = TimerManager::new();
//! let start = Instant::now();
//! let id = timers.start_repeating_at(start, Duration::from_millis(100)).unwrap();
//!
//! assert_eq!(timers.fire_due(start + Duration::from_millis(100)), vec![id]);
//! timers.stop(id).unwrap();
//! ```

mod error;
mod id;
pub mod logging;
pub mod signal;
mod timer;

pub use error::{CoreError, Result, TimerError};
pub use id::IdGenerator;
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{IntervalTimer, TimerId, TimerManager};
