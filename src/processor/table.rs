use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::IpAddr;

use log::debug;

use super::flow::{DecodedPacket, Endpoint, Flow, FlowKey, PacketRecord};
use crate::error::FlowError;

/// Groups packets into conversations keyed by their unordered endpoint pair.
///
/// Flows are kept in first-seen order so renderers can give each one a stable
/// lane.
#[derive(Debug, Clone)]
pub struct FlowTable {
    client_ip: IpAddr,
    index: HashMap<FlowKey, usize>,
    flows: Vec<(FlowKey, Flow)>,
}

impl FlowTable {
    pub fn new(client_ip: IpAddr) -> Self {
        Self {
            client_ip,
            index: HashMap::new(),
            flows: Vec::new(),
        }
    }

    pub fn client_ip(&self) -> IpAddr {
        self.client_ip
    }

    /// Places one packet in its flow, creating the flow on first sight.
    ///
    /// The table is left untouched when the packet is malformed.
    pub fn ingest(&mut self, packet: DecodedPacket) -> Result<(), FlowError> {
        let record = validate(packet)?;
        let key = FlowKey::new(record.src.ip, record.dst.ip, record.src.port, record.dst.port);

        match self.index.entry(key) {
            Entry::Occupied(e) => {
                let (_, flow) = &mut self.flows[*e.get()];
                flow.push(record);
            }
            Entry::Vacant(e) => {
                let (client, server) = orient(self.client_ip, record.src, record.dst);
                debug!("new flow {client} -> {server}");
                e.insert(self.flows.len());
                self.flows.push((key, Flow::new(client, server, record)));
            }
        }
        Ok(())
    }

    pub fn get_minimal_timestamp(&self) -> Result<f64, FlowError> {
        self.flows
            .iter()
            .map(|(_, flow)| flow.start_time)
            .reduce(f64::min)
            .ok_or(FlowError::EmptyTable)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&FlowKey, &Flow)> + '_ {
        self.flows.iter().map(|(key, flow)| (key, flow))
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> + '_ {
        self.flows.iter().map(|(_, flow)| flow)
    }

    pub fn get(&self, key: &FlowKey) -> Option<&Flow> {
        self.index.get(key).map(|&i| &self.flows[i].1)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

fn validate(packet: DecodedPacket) -> Result<PacketRecord, FlowError> {
    let missing = |field| FlowError::MalformedPacket { field };

    let src_ip = packet.src_ip.ok_or_else(|| missing("src_ip"))?;
    let src_port = packet.src_port.ok_or_else(|| missing("src_port"))?;
    let dst_ip = packet.dst_ip.ok_or_else(|| missing("dst_ip"))?;
    let dst_port = packet.dst_port.ok_or_else(|| missing("dst_port"))?;
    let sniff_timestamp = packet
        .sniff_timestamp
        .filter(|ts| ts.is_finite())
        .ok_or_else(|| missing("sniff_timestamp"))?;

    Ok(PacketRecord {
        src: Endpoint::new(src_ip, src_port),
        dst: Endpoint::new(dst_ip, dst_port),
        sniff_timestamp,
        transport: packet.transport,
        length: packet.length,
    })
}

/// Picks (client, server). The endpoint carrying the client ip is the client;
/// if neither or both do, the packet source is.
fn orient(client_ip: IpAddr, src: Endpoint, dst: Endpoint) -> (Endpoint, Endpoint) {
    if dst.ip == client_ip && src.ip != client_ip {
        (dst, src)
    } else {
        (src, dst)
    }
}
