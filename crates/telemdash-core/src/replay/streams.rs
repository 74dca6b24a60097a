use std::collections::BTreeMap;
use std::time::Duration;

use crate::telemetry::{DecodeError, DecodeOutcome, Protocol, TelemetryDecoder};
use crate::{RejectionSummary, StreamSummary};

#[derive(Debug, Default)]
pub(crate) struct StreamStats {
    pub packets: u64,
    pub decoded: u64,
    pub ignored: u64,
    pub rejected: u64,
    pub truncated: u64,
    rejections: BTreeMap<&'static str, (u64, String)>,
}

impl StreamStats {
    pub(crate) fn record(&mut self, result: &Result<DecodeOutcome, DecodeError>) {
        self.packets += 1;
        match result {
            Ok(DecodeOutcome::Updated(_)) => self.decoded += 1,
            Ok(DecodeOutcome::Ignored { .. }) => self.ignored += 1,
            Err(err) => {
                self.rejected += 1;
                let entry = self
                    .rejections
                    .entry(err.id())
                    .or_insert_with(|| (0, err.to_string()));
                entry.0 += 1;
            }
        }
    }

    pub(crate) fn into_summary(
        self,
        decoder: &dyn TelemetryDecoder,
        end: Duration,
    ) -> StreamSummary {
        let rejections = self
            .rejections
            .into_iter()
            .map(|(id, (count, example))| RejectionSummary {
                id: id.to_string(),
                count,
                example,
            })
            .collect();
        StreamSummary {
            protocol: decoder.protocol(),
            packets: self.packets,
            decoded: self.decoded,
            ignored: self.ignored,
            rejected: self.rejected,
            truncated: self.truncated,
            rejections,
            valid_at_end: decoder.is_valid(end),
            final_snapshot: (self.decoded > 0).then(|| decoder.snapshot(end)),
        }
    }
}

/// Per-protocol stats, iterated in protocol order.
#[derive(Debug, Default)]
pub(crate) struct Streams {
    f1: StreamStats,
    pcars: StreamStats,
}

impl Streams {
    pub(crate) fn get_mut(&mut self, protocol: Protocol) -> &mut StreamStats {
        match protocol {
            Protocol::F1 => &mut self.f1,
            Protocol::Pcars => &mut self.pcars,
        }
    }

    pub(crate) fn into_parts(self) -> [(Protocol, StreamStats); 2] {
        [(Protocol::F1, self.f1), (Protocol::Pcars, self.pcars)]
    }
}
