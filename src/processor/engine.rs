use log::{debug, info, warn};

use super::flow::DecodedPacket;
use super::table::FlowTable;
use crate::error::CaptureError;
use crate::types::IngestStats;

/// Folds a packet source into the table.
///
/// Source errors abort the fold. Packets the table rejects are logged and
/// skipped so one bad frame does not cost the rest of the capture.
pub fn build_flows<I>(source: I, table: &mut FlowTable) -> Result<IngestStats, CaptureError>
where
    I: IntoIterator<Item = Result<DecodedPacket, CaptureError>>,
{
    let mut stats = IngestStats::default();

    for item in source {
        let pkt = item?;
        stats.packets_seen += 1;

        match table.ingest(pkt) {
            Ok(()) => stats.packets_ingested += 1,
            Err(e) => {
                debug!("skipping packet #{}: {e}", stats.packets_seen);
                stats.packets_skipped += 1;
            }
        }
    }

    stats.flow_count = table.len() as u64;
    if stats.packets_skipped > 0 {
        warn!(
            "skipped {} of {} packets without IP addressing or ports",
            stats.packets_skipped, stats.packets_seen
        );
    }
    info!(
        "ingested {} of {} packets into {} flows",
        stats.packets_ingested, stats.packets_seen, stats.flow_count
    );
    Ok(stats)
}
