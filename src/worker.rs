// Background collection loop: one cycle, publish on success, fixed sleep, repeat.

use crate::collector::Collector;
use crate::docker_repo::ContainerRuntime;
use crate::netns::NamespaceOps;
use crate::snapshot_store::SnapshotStore;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::Instrument;

/// Collector, store and shutdown for the worker.
pub struct WorkerDeps<R, N> {
    pub collector: Arc<Collector<R, N>>,
    pub store: SnapshotStore,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub interval_ms: u64,
}

/// Runs one cycle and publishes its snapshot. On error the previous snapshot
/// stays visible. Returns whether a snapshot was published.
pub async fn run_cycle<R, N>(collector: &Collector<R, N>, store: &SnapshotStore) -> bool
where
    R: ContainerRuntime + Send + Sync + 'static,
    N: NamespaceOps + Send + Sync + 'static,
{
    match collector.collect().await {
        Ok(snapshot) => {
            tracing::debug!(
                operation = "publish_snapshot",
                containers = snapshot.len(),
                "Snapshot published"
            );
            store.publish(Arc::new(snapshot));
            true
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                operation = "collect_cycle",
                "Collection cycle failed; keeping previous snapshot"
            );
            false
        }
    }
}

pub fn spawn<R, N>(deps: WorkerDeps<R, N>, config: WorkerConfig) -> tokio::task::JoinHandle<()>
where
    R: ContainerRuntime + Send + Sync + 'static,
    N: NamespaceOps + Send + Sync + 'static,
{
    let WorkerDeps {
        collector,
        store,
        mut shutdown_rx,
    } = deps;
    let interval = Duration::from_millis(config.interval_ms);

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", interval_ms = config.interval_ms);
    tokio::spawn(
        async move {
            loop {
                run_cycle(&collector, &store).await;
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Worker shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(worker_span),
    )
}
