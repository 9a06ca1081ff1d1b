//! Relevance filter for raw events.

use std::path::Path;

use super::path_registry::PathRegistry;
use super::source::RawEvent;

/// Decides which raw events concern a watched target.
///
/// An event is relevant when its path is exactly one of the targets and it
/// carries a write, create, rename or remove operation. Everything else seen
/// in a watched directory (siblings, chmod-only events) is dropped.
#[derive(Debug, Clone)]
pub struct TargetFilter {
    registry: PathRegistry,
}

impl TargetFilter {
    pub fn new(registry: PathRegistry) -> Self {
        Self { registry }
    }

    /// Target the event belongs to, or `None` if it should be ignored.
    pub fn matches(&self, event: &RawEvent) -> Option<&Path> {
        if !event.ops.is_relevant() {
            return None;
        }
        self.registry.target_for(&event.path)
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }
}
