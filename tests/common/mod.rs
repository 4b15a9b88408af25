//! Shared fixtures: builds small capture files on disk.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use etherparse::PacketBuilder;
use tempfile::TempDir;

pub const LINKTYPE_ETHERNET: u32 = 1;

const MAC_A: [u8; 6] = [0x02, 0, 0, 0, 0, 0x01];
const MAC_B: [u8; 6] = [0x02, 0, 0, 0, 0, 0x02];

pub enum Frame {
    Tcp { src: [u8; 4], sport: u16, dst: [u8; 4], dport: u16 },
    Udp { src: [u8; 4], sport: u16, dst: [u8; 4], dport: u16 },
    Icmp { src: [u8; 4], dst: [u8; 4] },
}

impl Frame {
    pub fn bytes(&self) -> Vec<u8> {
        let eth = PacketBuilder::ethernet2(MAC_A, MAC_B);
        let mut out = Vec::new();
        let payload = [0u8; 4];
        let written = match *self {
            Frame::Tcp { src, sport, dst, dport } => eth
                .ipv4(src, dst, 64)
                .tcp(sport, dport, 1, 8192)
                .write(&mut out, &payload),
            Frame::Udp { src, sport, dst, dport } => eth
                .ipv4(src, dst, 64)
                .udp(sport, dport)
                .write(&mut out, &payload),
            Frame::Icmp { src, dst } => eth
                .ipv4(src, dst, 64)
                .icmpv4_echo_request(7, 1)
                .write(&mut out, &payload),
        };
        written.expect("frame fits in a vec");
        out
    }
}

/// Serialises frames as a classic little-endian microsecond pcap file.
pub fn pcap_bytes(linktype: u32, records: &[(f64, Vec<u8>)]) -> Vec<u8> {
    pcap_bytes_snapped(linktype, 65535, records)
}

/// Like `pcap_bytes`, but every record keeps at most `snaplen` captured
/// bytes while reporting its full wire length.
pub fn pcap_bytes_snapped(linktype: u32, snaplen: u32, records: &[(f64, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&snaplen.to_le_bytes());
    out.extend_from_slice(&linktype.to_le_bytes());

    for (ts, data) in records {
        let secs = ts.trunc() as u32;
        let micros = ((ts - ts.trunc()) * 1_000_000.0).round() as u32;
        let caplen = data.len().min(snaplen as usize);
        out.extend_from_slice(&secs.to_le_bytes());
        out.extend_from_slice(&micros.to_le_bytes());
        out.extend_from_slice(&(caplen as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&data[..caplen]);
    }
    out
}

pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

pub fn write_capture(linktype: u32, records: &[(f64, Frame)]) -> Fixture {
    let records: Vec<(f64, Vec<u8>)> = records.iter().map(|(ts, f)| (*ts, f.bytes())).collect();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("trace.pcap");
    fs::write(&path, pcap_bytes(linktype, &records)).expect("write capture");
    Fixture { dir, path }
}

pub fn write_raw(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write file");
    path
}

pub const CLIENT: [u8; 4] = [10, 0, 0, 1];
pub const DNS: [u8; 4] = [8, 8, 8, 8];
pub const OTHER: [u8; 4] = [192, 168, 1, 50];

/// The capture most tests share:
/// two TCP conversations and a DNS exchange from the client, an ICMP ping,
/// and traffic between two unrelated hosts.
pub fn office_trace() -> Fixture {
    write_capture(
        LINKTYPE_ETHERNET,
        &[
            (1000.25, Frame::Tcp { src: CLIENT, sport: 5000, dst: DNS, dport: 443 }),
            (1000.5, Frame::Icmp { src: CLIENT, dst: DNS }),
            (1000.75, Frame::Udp { src: CLIENT, sport: 53000, dst: DNS, dport: 53 }),
            (1001.0, Frame::Tcp { src: DNS, sport: 443, dst: CLIENT, dport: 5000 }),
            (1001.5, Frame::Tcp { src: OTHER, sport: 22, dst: DNS, dport: 40000 }),
            (1001.75, Frame::Udp { src: DNS, sport: 53, dst: CLIENT, dport: 53000 }),
            (1002.0, Frame::Tcp { src: CLIENT, sport: 5001, dst: DNS, dport: 443 }),
        ],
    )
}
