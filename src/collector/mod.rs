// Collection cycle: visit every running container's network namespace on one
// pinned OS thread and assemble a snapshot.

mod sampler;

pub use sampler::{SampleError, sample_container};

use crate::docker_repo::{ContainerRuntime, derive_display_name};
use crate::models::{ContainerRecord, RunningContainer, Snapshot};
use crate::netns::{NamespaceError, NamespaceGuard, NamespaceOps};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{instrument, warn};

/// Errors that abort a whole cycle. Per-container failures never show up here.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("cannot list running containers: {0:#}")]
    List(anyhow::Error),

    #[error("cannot capture current network namespace: {0}")]
    Capture(#[source] NamespaceError),

    #[error("cannot restore original network namespace: {0}")]
    Restoration(#[source] NamespaceError),

    #[error("cannot spawn collector thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("collector thread ended without a result")]
    Aborted,
}

const COLLECTOR_THREAD_NAME: &str = "netns-collector";

pub struct Collector<R, N> {
    runtime: Arc<R>,
    namespaces: Arc<N>,
    netstat_path: PathBuf,
}

impl<R, N> Collector<R, N>
where
    R: ContainerRuntime + Send + Sync + 'static,
    N: NamespaceOps + Send + Sync + 'static,
{
    pub fn new(runtime: Arc<R>, namespaces: Arc<N>, netstat_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            namespaces,
            netstat_path: netstat_path.into(),
        }
    }

    /// Runs one cycle and returns the complete snapshot, or an error if the
    /// cycle could not be completed safely.
    #[instrument(skip(self), fields(operation = "collect_cycle"))]
    pub async fn collect(&self) -> Result<Snapshot, CycleError> {
        let containers = self.runtime.list_running().await.map_err(CycleError::List)?;

        // setns() only affects the calling thread. The cycle gets a thread of
        // its own that exits with it, so a failed restore dies with the thread.
        let rt = Handle::current();
        let runtime = self.runtime.clone();
        let namespaces = self.namespaces.clone();
        let netstat_path = self.netstat_path.clone();
        let span = tracing::Span::current();
        let (tx, rx) = oneshot::channel();
        std::thread::Builder::new()
            .name(COLLECTOR_THREAD_NAME.into())
            .spawn(move || {
                let _guard = span.enter();
                let result = collect_pinned(
                    &rt,
                    runtime.as_ref(),
                    namespaces.as_ref(),
                    &netstat_path,
                    containers,
                );
                let _ = tx.send(result);
            })
            .map_err(CycleError::Spawn)?;
        rx.await.map_err(|_| CycleError::Aborted)?
    }
}

fn collect_pinned<R, N>(
    rt: &Handle,
    runtime: &R,
    namespaces: &N,
    netstat_path: &Path,
    containers: Vec<RunningContainer>,
) -> Result<Snapshot, CycleError>
where
    R: ContainerRuntime,
    N: NamespaceOps,
{
    let guard = NamespaceGuard::capture(namespaces).map_err(CycleError::Capture)?;

    let mut snapshot = Snapshot::with_capacity(containers.len());
    for container in containers {
        let display_name = match derive_display_name(&container.names) {
            Ok(name) => name,
            Err(e) => {
                warn!(
                    container_id = %container.id,
                    names = ?container.names,
                    error = %e,
                    operation = "derive_display_name",
                    "skipping container"
                );
                continue;
            }
        };

        match sample_container(rt, runtime, namespaces, netstat_path, &container.id) {
            Ok(counters) => {
                snapshot.insert(
                    container.id.clone(),
                    ContainerRecord {
                        id: container.id,
                        display_name,
                        counters,
                    },
                );
            }
            Err(e) => {
                warn!(
                    container_id = %container.id,
                    error = %e,
                    operation = "sample_container",
                    "skipping container"
                );
            }
        }
    }

    guard.restore().map_err(|e| {
        tracing::error!(
            error = %e,
            operation = "restore_namespace",
            "network namespace of the collector thread is now unknown"
        );
        CycleError::Restoration(e)
    })?;

    tracing::debug!(containers = snapshot.len(), "collection cycle complete");
    Ok(snapshot)
}
