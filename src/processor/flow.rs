use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

/// One side of a conversation.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Endpoint {
    pub ip: IpAddr,
    pub port: u16,
}

impl Endpoint {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            IpAddr::V4(ip) => write!(f, "{}:{}", ip, self.port),
            IpAddr::V6(ip) => write!(f, "[{}]:{}", ip, self.port),
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, Copy)]
pub struct FlowKey {
    pub ip_a: IpAddr,
    pub ip_b: IpAddr,
    pub port_a: u16,
    pub port_b: u16,
}

impl FlowKey {
    pub fn new(src_ip: IpAddr, dst_ip: IpAddr, src_port: u16, dst_port: u16) -> Self {
        // Normalize flow key so both directions map to the same entry
        if (src_ip, src_port) <= (dst_ip, dst_port) {
            Self {
                ip_a: src_ip,
                ip_b: dst_ip,
                port_a: src_port,
                port_b: dst_port,
            }
        } else {
            Self {
                ip_a: dst_ip,
                ip_b: src_ip,
                port_a: dst_port,
                port_b: src_port,
            }
        }
    }

    pub fn endpoints(&self) -> (Endpoint, Endpoint) {
        (
            Endpoint::new(self.ip_a, self.port_a),
            Endpoint::new(self.ip_b, self.port_b),
        )
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.endpoints();
        write!(f, "{{{a}, {b}}}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    Udp,
    Other,
}

/// What the capture decoder managed to extract from one record.
///
/// Every addressing field is optional: non-IP frames, ICMP or truncated
/// frames leave some of them empty and the flow table rejects those.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPacket {
    pub src_ip: Option<IpAddr>,
    pub src_port: Option<u16>,
    pub dst_ip: Option<IpAddr>,
    pub dst_port: Option<u16>,
    /// Capture time in seconds since the epoch.
    pub sniff_timestamp: Option<f64>,
    pub transport: Transport,
    pub length: u32,
}

impl DecodedPacket {
    /// A fully addressed record, mostly useful for feeding the table by hand.
    pub fn new(src: Endpoint, dst: Endpoint, sniff_timestamp: f64) -> Self {
        Self {
            src_ip: Some(src.ip),
            src_port: Some(src.port),
            dst_ip: Some(dst.ip),
            dst_port: Some(dst.port),
            sniff_timestamp: Some(sniff_timestamp),
            transport: Transport::Other,
            length: 0,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }
}

/// A validated packet stored inside a flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketRecord {
    pub src: Endpoint,
    pub dst: Endpoint,
    pub sniff_timestamp: f64,
    pub transport: Transport,
    pub length: u32,
}

/// A conversation between the configured client and a remote server.
#[derive(Debug, Clone)]
pub struct Flow {
    pub client: Endpoint,
    pub server: Endpoint,
    pub packets: Vec<PacketRecord>,
    pub start_time: f64,
    pub end_time: f64,
}

impl Flow {
    pub fn new(client: Endpoint, server: Endpoint, first: PacketRecord) -> Self {
        let ts = first.sniff_timestamp;
        Self {
            client,
            server,
            packets: vec![first],
            start_time: ts,
            end_time: ts,
        }
    }

    /// Appends a packet and widens the time bounds. Captures are usually
    /// ordered but merged files are not, so both bounds are clamped.
    pub fn push(&mut self, packet: PacketRecord) {
        let ts = packet.sniff_timestamp;
        self.start_time = self.start_time.min(ts);
        self.end_time = self.end_time.max(ts);
        self.packets.push(packet);
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn bytes(&self) -> u64 {
        self.packets.iter().map(|p| u64::from(p.length)).sum()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.packets.iter().map(|p| p.sniff_timestamp)
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.client, self.server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(ip: &str, port: u16) -> Endpoint {
        Endpoint::new(ip.parse().unwrap(), port)
    }

    fn record(src: Endpoint, dst: Endpoint, ts: f64) -> PacketRecord {
        PacketRecord {
            src,
            dst,
            sniff_timestamp: ts,
            transport: Transport::Tcp,
            length: 60,
        }
    }

    #[test]
    fn key_ignores_direction() {
        let a = ep("10.0.0.1", 5000);
        let b = ep("8.8.8.8", 443);
        assert_eq!(
            FlowKey::new(a.ip, b.ip, a.port, b.port),
            FlowKey::new(b.ip, a.ip, b.port, a.port)
        );
    }

    #[test]
    fn key_distinguishes_ports() {
        let a = FlowKey::new("10.0.0.1".parse().unwrap(), "8.8.8.8".parse().unwrap(), 5000, 443);
        let b = FlowKey::new("10.0.0.1".parse().unwrap(), "8.8.8.8".parse().unwrap(), 5001, 443);
        assert_ne!(a, b);
    }

    #[test]
    fn same_ip_orders_by_port() {
        let key = FlowKey::new("127.0.0.1".parse().unwrap(), "127.0.0.1".parse().unwrap(), 9000, 80);
        assert_eq!(key.port_a, 80);
        assert_eq!(key.port_b, 9000);
    }

    #[test]
    fn push_widens_bounds_out_of_order() {
        let c = ep("10.0.0.1", 5000);
        let s = ep("8.8.8.8", 443);
        let mut flow = Flow::new(c, s, record(c, s, 5.0));
        flow.push(record(s, c, 7.5));
        flow.push(record(c, s, 3.0));
        assert_eq!(flow.start_time, 3.0);
        assert_eq!(flow.end_time, 7.5);
        assert_eq!(flow.len(), 3);
        assert_eq!(flow.duration(), 4.5);
        assert_eq!(flow.bytes(), 180);
    }

    #[test]
    fn display_formats() {
        let flow = Flow::new(
            ep("10.0.0.1", 5000),
            ep("2001:db8::1", 443),
            record(ep("10.0.0.1", 5000), ep("2001:db8::1", 443), 1.0),
        );
        assert_eq!(flow.to_string(), "10.0.0.1:5000 -> [2001:db8::1]:443");
    }
}
