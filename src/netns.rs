// Network namespace switching for the calling thread (setns)

use nix::sched::{CloneFlags, setns};
use std::fmt;
use std::fs::File;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Network namespace of the calling thread. `/proc/self` would resolve to the
/// thread group leader, which is not the thread doing the switching.
pub const THREAD_NETNS_PATH: &str = "/proc/thread-self/ns/net";

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("cannot open network namespace {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("setns failed: {0}")]
    Enter(#[from] nix::errno::Errno),
}

/// Switching of the calling thread's network namespace. Handles are released
/// by dropping them.
pub trait NamespaceOps {
    type Handle: fmt::Debug;

    /// Handle to the namespace the calling thread is in right now.
    fn current(&self) -> Result<Self::Handle, NamespaceError>;

    fn open(&self, path: &Path) -> Result<Self::Handle, NamespaceError>;

    /// Moves the calling thread into `handle`'s namespace.
    fn enter(&self, handle: &Self::Handle) -> Result<(), NamespaceError>;
}

/// Open namespace file; the fd is closed on drop.
pub struct NetNamespace {
    file: File,
}

impl fmt::Debug for NetNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file.metadata() {
            Ok(m) => write!(f, "NS({}:{})", m.dev(), m.ino()),
            Err(_) => f.write_str("NS(unknown)"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxNamespaces;

impl NamespaceOps for LinuxNamespaces {
    type Handle = NetNamespace;

    fn current(&self) -> Result<NetNamespace, NamespaceError> {
        self.open(Path::new(THREAD_NETNS_PATH))
    }

    fn open(&self, path: &Path) -> Result<NetNamespace, NamespaceError> {
        File::open(path)
            .map(|file| NetNamespace { file })
            .map_err(|source| NamespaceError::Open {
                path: path.to_path_buf(),
                source,
            })
    }

    fn enter(&self, handle: &NetNamespace) -> Result<(), NamespaceError> {
        setns(&handle.file, CloneFlags::CLONE_NEWNET)?;
        Ok(())
    }
}

/// Remembers the namespace the thread was in when captured and switches back
/// to it, either through [`NamespaceGuard::restore`] or, failing that, on drop.
pub struct NamespaceGuard<'a, N: NamespaceOps> {
    ops: &'a N,
    original: Option<N::Handle>,
}

impl<'a, N: NamespaceOps> NamespaceGuard<'a, N> {
    pub fn capture(ops: &'a N) -> Result<Self, NamespaceError> {
        let original = ops.current()?;
        tracing::debug!(namespace = ?original, "captured original network namespace");
        Ok(Self {
            ops,
            original: Some(original),
        })
    }

    /// Switches back and reports the outcome. The original handle is closed either way.
    pub fn restore(mut self) -> Result<(), NamespaceError> {
        match self.original.take() {
            Some(original) => self.ops.enter(&original),
            None => Ok(()),
        }
    }
}

impl<N: NamespaceOps> Drop for NamespaceGuard<'_, N> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take()
            && let Err(e) = self.ops.enter(&original)
        {
            tracing::error!(
                error = %e,
                operation = "restore_namespace",
                "failed to restore network namespace on early exit"
            );
        }
    }
}
