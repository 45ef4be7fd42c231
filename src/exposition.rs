// Prometheus text exposition of a snapshot

use crate::models::{ContainerRecord, Snapshot};
use std::fmt::Write;

pub const RECEIVED_COUNTER_NAME: &str = "docker_network_received_bytes_total";
pub const SENT_COUNTER_NAME: &str = "docker_network_sent_bytes_total";

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders the received block then the sent block. Headers are written even
/// when the snapshot is empty.
pub fn render(snapshot: &Snapshot) -> String {
    let mut records: Vec<&ContainerRecord> = snapshot.values().collect();
    records.sort_by(|a, b| (&a.display_name, &a.id).cmp(&(&b.display_name, &b.id)));

    let mut out = String::new();
    write_counter(&mut out, RECEIVED_COUNTER_NAME, &records, |r| {
        r.counters.received_octets
    });
    write_counter(&mut out, SENT_COUNTER_NAME, &records, |r| r.counters.sent_octets);
    out
}

fn write_counter(
    out: &mut String,
    name: &str,
    records: &[&ContainerRecord],
    value: impl Fn(&ContainerRecord) -> u64,
) {
    // Writing into a String cannot fail.
    let _ = write!(out, "# HELP {name}\n# TYPE {name} counter\n");
    for r in records {
        let _ = writeln!(
            out,
            "{name}{{container=\"{}\"}} {}",
            escape_label(&r.display_name),
            value(r)
        );
    }
}

fn escape_label(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
