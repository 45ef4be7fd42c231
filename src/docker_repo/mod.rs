// Docker container listing and namespace lookup via bollard

mod naming;

pub use naming::{NameError, derive_display_name};

use crate::models::RunningContainer;
use bollard::Docker;
use bollard::query_parameters::{InspectContainerOptions, ListContainersOptions};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use tracing::{instrument, warn};

/// What the collector needs from a container runtime.
pub trait ContainerRuntime {
    fn list_running(&self) -> impl Future<Output = anyhow::Result<Vec<RunningContainer>>> + Send;

    /// Path of the file that pins the container's network namespace.
    fn namespace_path(&self, id: &str) -> impl Future<Output = anyhow::Result<PathBuf>> + Send;
}

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self { docker })
    }
}

impl ContainerRuntime for DockerRepo {
    #[instrument(skip(self), fields(repo = "docker", operation = "list_running"))]
    async fn list_running(&self) -> anyhow::Result<Vec<RunningContainer>> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let filter = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let summaries = self.docker.list_containers(Some(filter)).await?;
        let mut containers = Vec::with_capacity(summaries.len());
        for c in summaries {
            let Some(id) = c.id else {
                warn!(names = ?c.names, "Docker returned a container without id");
                continue;
            };
            containers.push(RunningContainer {
                id,
                names: c.names.unwrap_or_default(),
            });
        }
        Ok(containers)
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "namespace_path"))]
    async fn namespace_path(&self, id: &str) -> anyhow::Result<PathBuf> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        let pid = inspect
            .state
            .and_then(|s| s.pid)
            .filter(|pid| *pid > 0)
            .ok_or_else(|| anyhow::anyhow!("container {} has no running process", id))?;
        Ok(netns_path_for_pid(pid))
    }
}

/// `/proc/<pid>/ns/net` of a container's init process.
pub fn netns_path_for_pid(pid: i64) -> PathBuf {
    PathBuf::from(format!("/proc/{}/ns/net", pid))
}
