//! Checkpoint capability used by the applier.
//!
//! The engine only ever talks to the `CheckpointProvider` trait; which
//! snapshot mechanism sits behind it is the caller's business. The git
//! implementation snapshots the working tree as an unreferenced tree
//! object, so a discarded checkpoint costs nothing and is reclaimed by
//! ordinary repository maintenance.

use crate::common::run_with_timeout;
use crate::core::errors::{Error, Result};
use git2::build::CheckoutBuilder;
use git2::{IndexAddOption, Oid, Repository};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Opaque handle to a restorable snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckpointHandle {
    id: String,
}

impl CheckpointHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

pub trait CheckpointProvider {
    fn create(&mut self) -> Result<CheckpointHandle>;
    fn restore(&mut self, handle: &CheckpointHandle) -> Result<()>;
    fn discard(&mut self, handle: CheckpointHandle);
}

/// Git-backed provider: the checkpoint is a tree object written from the
/// full working tree (untracked files included). Restore force-checks-out
/// that tree over the working directory without moving HEAD.
pub struct GitCheckpointProvider {
    root: PathBuf,
    timeout: Duration,
}

impl GitCheckpointProvider {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }
}

impl CheckpointProvider for GitCheckpointProvider {
    fn create(&mut self) -> Result<CheckpointHandle> {
        let root = self.root.clone();
        run_with_timeout("checkpoint create", self.timeout, move || {
            snapshot_working_tree(&root)
        })
    }

    fn restore(&mut self, handle: &CheckpointHandle) -> Result<()> {
        let root = self.root.clone();
        let id = handle.id.clone();
        run_with_timeout("checkpoint restore", self.timeout, move || {
            restore_working_tree(&root, &id)
        })
    }

    fn discard(&mut self, _handle: CheckpointHandle) {}
}

fn snapshot_working_tree(root: &Path) -> Result<CheckpointHandle> {
    let repo = open_repository(root)?;
    let mut index = repo.index().map_err(git_failure)?;

    if index.has_conflicts() {
        return Err(Error::checkpoint(
            "working tree has unresolved conflicts; refusing to checkpoint",
        ));
    }

    // In-memory only: the on-disk index is never written, so nothing gets
    // staged on the user's behalf.
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .map_err(git_failure)?;
    let tree_oid = index.write_tree().map_err(git_failure)?;

    Ok(CheckpointHandle::new(tree_oid.to_string()))
}

fn restore_working_tree(root: &Path, id: &str) -> Result<()> {
    let repo = open_repository(root)?;
    let oid = Oid::from_str(id)
        .map_err(|e| Error::checkpoint(format!("malformed checkpoint handle: {}", e.message())))?;
    let tree = repo.find_tree(oid).map_err(git_failure)?;

    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(tree.as_object(), Some(&mut checkout))
        .map_err(git_failure)?;
    Ok(())
}

fn open_repository(root: &Path) -> Result<Repository> {
    Repository::discover(root)
        .map_err(|e| Error::checkpoint(format!("cannot open repository: {}", e.message())))
}

fn git_failure(err: git2::Error) -> Error {
    Error::checkpoint(err.message().to_string())
}

/// In-memory provider for tests and non-repository projects: snapshots the
/// byte content of a fixed file set and writes it back on restore. Files
/// absent at snapshot time are deleted again on restore.
pub struct InMemoryCheckpointProvider {
    files: Vec<PathBuf>,
    snapshots: HashMap<String, Vec<(PathBuf, Option<Vec<u8>>)>>,
    next_id: u64,
}

impl InMemoryCheckpointProvider {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            snapshots: HashMap::new(),
            next_id: 0,
        }
    }
}

impl CheckpointProvider for InMemoryCheckpointProvider {
    fn create(&mut self) -> Result<CheckpointHandle> {
        let mut snapshot = Vec::new();
        for file in &self.files {
            let content = match fs::read(file) {
                Ok(bytes) => Some(bytes),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                Err(err) => {
                    return Err(Error::checkpoint(format!(
                        "cannot snapshot {}: {err}",
                        file.display()
                    )))
                }
            };
            snapshot.push((file.clone(), content));
        }

        self.next_id += 1;
        let handle = CheckpointHandle::new(self.next_id.to_string());
        self.snapshots.insert(handle.id.clone(), snapshot);
        Ok(handle)
    }

    fn restore(&mut self, handle: &CheckpointHandle) -> Result<()> {
        let snapshot = self
            .snapshots
            .get(handle.id())
            .ok_or_else(|| Error::checkpoint("unknown checkpoint handle"))?;

        for (file, content) in snapshot {
            match content {
                Some(bytes) => {
                    fs::write(file, bytes)
                        .map_err(|e| Error::checkpoint(format!("restore failed: {e}")))?;
                }
                None => {
                    if file.exists() {
                        fs::remove_file(file)
                            .map_err(|e| Error::checkpoint(format!("restore failed: {e}")))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn discard(&mut self, handle: CheckpointHandle) {
        self.snapshots.remove(handle.id());
    }
}
