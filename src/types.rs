use serde::{Deserialize, Serialize};

/// Counters collected while folding a capture into the flow table.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub packets_seen: u64,
    pub packets_ingested: u64,
    pub packets_skipped: u64,
    pub flow_count: u64,
}
