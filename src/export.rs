use std::io::{self, Write};

use serde::Serialize;

use crate::processor::{Endpoint, Flow, FlowTable};
use crate::render::{hex, palette_entry};
use crate::types::IngestStats;

#[derive(Debug, Serialize)]
struct FlowDTO {
    client: Endpoint,
    server: Endpoint,
    /// Same colour the views give the client port.
    color: String,
    packets: usize,
    bytes: u64,
    start_time: f64,
    end_time: f64,
    duration: f64,
    timestamps: Vec<f64>,
}

impl From<&Flow> for FlowDTO {
    fn from(flow: &Flow) -> Self {
        Self {
            client: flow.client,
            server: flow.server,
            color: hex(palette_entry(flow.client.port)),
            packets: flow.len(),
            bytes: flow.bytes(),
            start_time: flow.start_time,
            end_time: flow.end_time,
            duration: flow.duration(),
            timestamps: flow.timestamps().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    client_ip: String,
    /// Minimal start time, absent for an empty table.
    origin: Option<f64>,
    stats: &'a IngestStats,
    flows: Vec<FlowDTO>,
}

/// Dumps the table as pretty JSON, flows in first-seen order.
pub fn write_json<W: Write>(
    table: &FlowTable,
    stats: &IngestStats,
    writer: W,
) -> serde_json::Result<()> {
    let report = Report {
        client_ip: table.client_ip().to_string(),
        origin: table.get_minimal_timestamp().ok(),
        stats,
        flows: table.flows().map(FlowDTO::from).collect(),
    };
    serde_json::to_writer_pretty(writer, &report)
}

/// Plain text listing for terminals without an interactive session.
pub fn write_text<W: Write>(table: &FlowTable, mut writer: W) -> io::Result<()> {
    let origin = table.get_minimal_timestamp().unwrap_or_default();
    for (i, flow) in table.flows().enumerate() {
        writeln!(
            writer,
            "{:>4}  {:<48}  {:>6} pkts  {:>10.6}s .. {:>10.6}s",
            i,
            flow.to_string(),
            flow.len(),
            flow.start_time - origin,
            flow.end_time - origin,
        )?;
    }
    Ok(())
}
