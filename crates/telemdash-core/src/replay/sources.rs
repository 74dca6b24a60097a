use std::collections::HashMap;
use std::net::SocketAddr;

use crate::SourceSummary;
use crate::telemetry::Protocol;

#[derive(Debug, Hash, PartialEq, Eq)]
pub(crate) struct SourceKey {
    pub protocol: Protocol,
    pub src: SocketAddr,
    pub dst: SocketAddr,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct SourceStats {
    pub packets: u64,
    pub bytes: u64,
}

pub(crate) fn add_source_stats(
    stats: &mut HashMap<SourceKey, SourceStats>,
    key: SourceKey,
    payload_len: usize,
) {
    let entry = stats.entry(key).or_default();
    entry.packets += 1;
    entry.bytes += payload_len as u64;
}

pub(crate) fn build_source_summaries(stats: HashMap<SourceKey, SourceStats>) -> Vec<SourceSummary> {
    let mut sources: Vec<SourceSummary> = stats
        .into_iter()
        .map(|(key, stats)| SourceSummary {
            protocol: key.protocol,
            src: key.src.to_string(),
            dst: key.dst.to_string(),
            packets: stats.packets,
            bytes: stats.bytes,
        })
        .collect();

    sources.sort_by(|a, b| {
        a.src
            .cmp(&b.src)
            .then_with(|| a.dst.cmp(&b.dst))
            .then_with(|| a.protocol.cmp(&b.protocol))
    });
    sources
}
