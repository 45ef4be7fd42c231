// Namespace-scoped network counters

/// Aggregate byte counters of one network namespace, as read from the `IpExt` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkCounters {
    pub received_octets: u64,
    pub sent_octets: u64,
}
