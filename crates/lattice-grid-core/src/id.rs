//! Widget instance id generation.
//!
//! Every widget instance needs an id that is unique within the process, for
//! example to key its entry in the selection registry. The generator is owned
//! by the host application and handed to widgets when they are created.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CoreError, Result};
use crate::logging::targets;

/// Produces counter-suffixed ids of the form `"{prefix}-{n}"`.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose first id ends in `-0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator starting at an arbitrary counter value.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocate the next id for `prefix`.
    ///
    /// The counter is shared by all prefixes, so ids stay unique even when two
    /// widget kinds share a prefix by accident.
    pub fn next_id(&self, prefix: &str) -> Result<String> {
        if prefix.is_empty() {
            return Err(CoreError::invalid_id_prefix(prefix, "prefix must not be empty"));
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(CoreError::invalid_id_prefix(
                prefix,
                "prefix must not contain whitespace",
            ));
        }

        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let id = format!("{prefix}-{n}");
        tracing::trace!(target: targets::ID, %id, "allocated widget id");
        Ok(id)
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

static_assertions::assert_impl_all!(IdGenerator: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_counter_suffixed() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_id("drop-down").unwrap(), "drop-down-0");
        assert_eq!(ids.next_id("combo").unwrap(), "combo-1");
        assert_eq!(ids.next_id("drop-down").unwrap(), "drop-down-2");
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn test_starting_at() {
        let ids = IdGenerator::starting_at(10);
        assert_eq!(ids.next_id("grid").unwrap(), "grid-10");
    }

    #[test]
    fn test_invalid_prefix() {
        let ids = IdGenerator::new();
        assert!(ids.next_id("").is_err());
        assert!(ids.next_id("my grid").is_err());
        assert_eq!(ids.issued(), 0);
    }
}
