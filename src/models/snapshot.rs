// Per-cycle snapshot

use std::collections::HashMap;

use super::ContainerRecord;

/// Container id -> latest record, built in full by one collection cycle.
pub type Snapshot = HashMap<String, ContainerRecord>;
