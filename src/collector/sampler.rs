// Per-container sampling: switch into the container's network namespace and read IpExt

use crate::docker_repo::ContainerRuntime;
use crate::models::NetworkCounters;
use crate::netns::{NamespaceError, NamespaceOps};
use crate::netstat::{self, StatsError};
use std::path::Path;
use thiserror::Error;
use tokio::runtime::Handle;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("cannot resolve network namespace: {0:#}")]
    NamespaceResolution(anyhow::Error),

    #[error("cannot switch network namespace: {0}")]
    NamespaceSwitch(#[source] NamespaceError),

    #[error(transparent)]
    Statistics(#[from] StatsError),
}

/// Moves the calling thread into the container's network namespace and reads
/// its counters. The thread is left in that namespace; switching back is the
/// caller's job. Must run on a thread that is allowed to block.
pub fn sample_container<R, N>(
    rt: &Handle,
    runtime: &R,
    namespaces: &N,
    netstat_path: &Path,
    id: &str,
) -> Result<NetworkCounters, SampleError>
where
    R: ContainerRuntime,
    N: NamespaceOps,
{
    let ns_path = rt
        .block_on(runtime.namespace_path(id))
        .map_err(SampleError::NamespaceResolution)?;
    let handle = namespaces
        .open(&ns_path)
        .map_err(|e| SampleError::NamespaceResolution(e.into()))?;

    tracing::debug!(container_id = id, namespace = ?handle, "entering network namespace");
    let entered = namespaces.enter(&handle);
    drop(handle);
    entered.map_err(SampleError::NamespaceSwitch)?;

    Ok(netstat::read_counters(netstat_path)?)
}
