use std::net::IpAddr;
use std::path::Path;

use etherparse::{LaxPacketHeaders, NetHeaders, TransportHeader};
use log::{debug, info};
use pcap::{Capture, Linktype, Offline, PacketHeader};

use crate::error::CaptureError;
use crate::processor::{DecodedPacket, Transport};

// libpcap reports DLT_* values for open captures, which differ from the
// LINKTYPE_* values stored in the file for a few encapsulations.
const DLT_NULL: i32 = 0;
const DLT_EN10MB: i32 = 1;
const DLT_RAW: i32 = 12;
const DLT_RAW_OPENBSD: i32 = 14;
const LINKTYPE_RAW: i32 = 101;
const DLT_LOOP: i32 = 108;
const DLT_LINUX_SLL: i32 = 113;
const DLT_IPV4: i32 = 228;
const DLT_IPV6: i32 = 229;

const LOOPBACK_HEADER_LEN: usize = 4;
const SLL_HEADER_LEN: usize = 16;

/// Encapsulation of the frames in a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLayer {
    Ethernet,
    RawIp,
    /// BSD loopback, a 4 byte address family in front of the IP header.
    Loopback,
    LinuxSll,
}

impl LinkLayer {
    pub fn from_linktype(linktype: Linktype) -> Result<Self, CaptureError> {
        match linktype.0 {
            DLT_EN10MB => Ok(Self::Ethernet),
            DLT_RAW | DLT_RAW_OPENBSD | LINKTYPE_RAW | DLT_IPV4 | DLT_IPV6 => Ok(Self::RawIp),
            DLT_NULL | DLT_LOOP => Ok(Self::Loopback),
            DLT_LINUX_SLL => Ok(Self::LinuxSll),
            other => Err(CaptureError::UnsupportedLinktype(other)),
        }
    }
}

/// One-shot reader over a capture file. Yields a decoded record per frame
/// that passes the display filter.
pub struct PacketReader {
    capture: Capture<Offline>,
    link: LinkLayer,
    done: bool,
}

impl PacketReader {
    pub fn open(path: impl AsRef<Path>, filter: &str) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let mut capture = Capture::from_file(path).map_err(|source| CaptureError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        if !filter.trim().is_empty() {
            capture
                .filter(filter, true)
                .map_err(|source| CaptureError::Filter {
                    filter: filter.to_string(),
                    source,
                })?;
        }

        let link = LinkLayer::from_linktype(capture.get_datalink())?;
        info!("Capture: {} opened ({link:?})", path.display());
        info!("Filter: {filter} applied");

        Ok(Self {
            capture,
            link,
            done: false,
        })
    }

    pub fn link_layer(&self) -> LinkLayer {
        self.link
    }
}

impl Iterator for PacketReader {
    type Item = Result<DecodedPacket, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.capture.next_packet() {
            Ok(packet) => Some(Ok(decode_record(packet.header, packet.data, self.link))),
            Err(pcap::Error::NoMorePackets) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(CaptureError::Read(e)))
            }
        }
    }
}

fn decode_record(header: &PacketHeader, data: &[u8], link: LinkLayer) -> DecodedPacket {
    let timestamp = header.ts.tv_sec as f64 + header.ts.tv_usec as f64 / 1_000_000.0;
    decode_frame(data, link, timestamp, header.len)
}

/// Extracts addressing from a raw frame. Whatever cannot be parsed is left
/// empty; the flow table decides whether the record is usable.
///
/// Parsing is lax: captures taken with a snaplen cut the payload off, but the
/// headers in front of the cut still carry the addressing.
pub fn decode_frame(data: &[u8], link: LinkLayer, timestamp: f64, length: u32) -> DecodedPacket {
    let mut decoded = DecodedPacket {
        src_ip: None,
        src_port: None,
        dst_ip: None,
        dst_port: None,
        sniff_timestamp: Some(timestamp),
        transport: Transport::Other,
        length,
    };

    let parsed = match link {
        LinkLayer::Ethernet => LaxPacketHeaders::from_ethernet(data).map_err(|e| e.to_string()),
        LinkLayer::RawIp => LaxPacketHeaders::from_ip(data).map_err(|e| e.to_string()),
        LinkLayer::Loopback => strip(data, LOOPBACK_HEADER_LEN)
            .and_then(|ip| LaxPacketHeaders::from_ip(ip).map_err(|e| e.to_string())),
        LinkLayer::LinuxSll => strip(data, SLL_HEADER_LEN)
            .and_then(|ip| LaxPacketHeaders::from_ip(ip).map_err(|e| e.to_string())),
    };

    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Failed to parse frame: {e}");
            return decoded;
        }
    };

    if let Some((e, layer)) = &parsed.stop_err {
        debug!("Frame cut short at {layer:?}: {e}");
    }

    match &parsed.net {
        Some(NetHeaders::Ipv4(ipv4, _)) => {
            decoded.src_ip = Some(IpAddr::from(ipv4.source));
            decoded.dst_ip = Some(IpAddr::from(ipv4.destination));
        }
        Some(NetHeaders::Ipv6(ipv6, _)) => {
            decoded.src_ip = Some(IpAddr::from(ipv6.source));
            decoded.dst_ip = Some(IpAddr::from(ipv6.destination));
        }
        _ => {}
    }

    match &parsed.transport {
        Some(TransportHeader::Tcp(tcp)) => {
            decoded.src_port = Some(tcp.source_port);
            decoded.dst_port = Some(tcp.destination_port);
            decoded.transport = Transport::Tcp;
        }
        Some(TransportHeader::Udp(udp)) => {
            decoded.src_port = Some(udp.source_port);
            decoded.dst_port = Some(udp.destination_port);
            decoded.transport = Transport::Udp;
        }
        _ => {}
    }

    decoded
}

fn strip(data: &[u8], len: usize) -> Result<&[u8], String> {
    data.get(len..)
        .ok_or_else(|| format!("frame shorter than {len} byte link header"))
}
