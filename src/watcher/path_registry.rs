//! Target registry grouped by containing directory.
//!
//! The session loop registers each distinct parent directory exactly once,
//! no matter how many targets live in it. Events are attributed to a target
//! only on exact path equality.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Read-only registry of target files and the directories that hold them.
#[derive(Debug, Default, Clone)]
pub struct PathRegistry {
    /// Directory -> targets inside it, in insertion order.
    groups: BTreeMap<PathBuf, Vec<PathBuf>>,
    /// Total number of distinct targets.
    target_count: usize,
}

impl PathRegistry {
    /// Build the registry from target paths. Duplicate targets are kept once.
    pub fn new(targets: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut registry = Self::default();

        for target in targets {
            let dir = Self::parent_dir(&target);
            let entry = registry.groups.entry(dir).or_default();
            if !entry.contains(&target) {
                entry.push(target);
                registry.target_count += 1;
            }
        }

        registry
    }

    /// Directory that must be watched for `path`.
    pub fn parent_dir(path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Find the registered target equal to `path`.
    pub fn target_for(&self, path: &Path) -> Option<&Path> {
        self.groups
            .get(&Self::parent_dir(path))?
            .iter()
            .find(|target| target.as_path() == path)
            .map(PathBuf::as_path)
    }

    /// Directories to register with the event source.
    pub fn watch_dirs(&self) -> impl Iterator<Item = &Path> {
        self.groups.keys().map(PathBuf::as_path)
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn dir_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target_count == 0
    }
}
