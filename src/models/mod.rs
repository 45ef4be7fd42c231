// Domain models

mod container;
mod network;
mod snapshot;

pub use container::{ContainerRecord, RunningContainer};
pub use network::NetworkCounters;
pub use snapshot::Snapshot;
