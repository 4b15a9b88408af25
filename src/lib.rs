pub mod capture;
pub mod config;
pub mod error;
pub mod export;
pub mod processor;
pub mod render;
pub mod types;

use capture::PacketReader;
use config::Config;
use error::CaptureError;
use processor::FlowTable;
use types::IngestStats;

/// Reads the configured capture and groups its packets into flows.
pub fn load_flows(config: &Config) -> Result<(FlowTable, IngestStats), CaptureError> {
    let reader = PacketReader::open(&config.pcap_path, &config.capture_filter())?;
    let mut table = FlowTable::new(config.client_ip);
    let stats = processor::build_flows(reader, &mut table)?;
    Ok((table, stats))
}
