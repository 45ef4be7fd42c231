// Container models

use super::NetworkCounters;

/// A running container as reported by the runtime, before any sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningContainer {
    pub id: String,
    /// Raw names as the runtime reports them (Docker prefixes them with `/`).
    pub names: Vec<String>,
}

/// One successfully sampled container. Only built when both the display name
/// and the counters are available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub id: String,
    pub display_name: String,
    pub counters: NetworkCounters,
}
