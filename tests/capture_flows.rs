mod common;

use std::net::IpAddr;

use common::{
    office_trace, pcap_bytes, pcap_bytes_snapped, write_capture, write_raw, Frame, CLIENT, DNS,
    LINKTYPE_ETHERNET,
};
use flowtrace::capture::{LinkLayer, PacketReader};
use flowtrace::config::{Config, FileConfig};
use flowtrace::error::CaptureError;
use flowtrace::processor::{build_flows, Endpoint, FlowTable, Transport};

fn ep(ip: [u8; 4], port: u16) -> Endpoint {
    Endpoint::new(IpAddr::from(ip), port)
}

fn config(path: &std::path::Path, filter: &str) -> Config {
    Config::resolve(FileConfig {
        pcap_path: Some(path.to_path_buf()),
        client_ip: Some("10.0.0.1".into()),
        display_filter: Some(filter.into()),
        view: None,
    })
    .unwrap()
}

#[test]
fn reader_yields_every_frame_without_filter() {
    let fixture = office_trace();
    let reader = PacketReader::open(&fixture.path, "").unwrap();
    assert_eq!(reader.link_layer(), LinkLayer::Ethernet);

    let packets: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(packets.len(), 7);
    assert_eq!(packets[0].sniff_timestamp, Some(1000.25));
    assert_eq!(packets[0].transport, Transport::Tcp);
    assert_eq!(packets[1].src_port, None);
    assert_eq!(packets[2].transport, Transport::Udp);
}

#[test]
fn client_filter_drops_unrelated_hosts() {
    let fixture = office_trace();
    let (table, stats) = flowtrace::load_flows(&config(&fixture.path, "")).unwrap();

    // the ping passes the host filter but has no ports
    assert_eq!(stats.packets_seen, 6);
    assert_eq!(stats.packets_skipped, 1);
    assert_eq!(stats.packets_ingested, 5);
    assert_eq!(stats.flow_count, 3);

    let flows: Vec<_> = table.flows().collect();
    assert_eq!(flows[0].client, ep(CLIENT, 5000));
    assert_eq!(flows[0].server, ep(DNS, 443));
    assert_eq!(flows[0].len(), 2);
    assert_eq!(flows[0].start_time, 1000.25);
    assert_eq!(flows[0].end_time, 1001.0);

    assert_eq!(flows[1].client, ep(CLIENT, 53000));
    assert_eq!(flows[1].server, ep(DNS, 53));
    assert_eq!(flows[1].len(), 2);

    assert_eq!(flows[2].client, ep(CLIENT, 5001));
    assert_eq!(flows[2].len(), 1);

    assert_eq!(table.get_minimal_timestamp(), Ok(1000.25));
}

#[test]
fn display_filter_narrows_the_capture() {
    let fixture = office_trace();
    let (table, stats) = flowtrace::load_flows(&config(&fixture.path, "tcp")).unwrap();

    assert_eq!(stats.packets_seen, 3);
    assert_eq!(stats.packets_skipped, 0);
    assert_eq!(table.len(), 2);
    assert!(table.flows().all(|f| f.server.port == 443));
}

#[test]
fn filter_matching_nothing_gives_empty_table() {
    let fixture = office_trace();
    let (table, stats) = flowtrace::load_flows(&config(&fixture.path, "port 9")).unwrap();
    assert_eq!(stats.packets_seen, 0);
    assert!(table.is_empty());
}

#[test]
fn missing_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let err = PacketReader::open(dir.path().join("absent.pcap"), "").err().unwrap();
    assert!(matches!(err, CaptureError::Open { .. }));
}

#[test]
fn invalid_filter_is_reported() {
    let fixture = office_trace();
    let err = PacketReader::open(&fixture.path, "host and and").err().unwrap();
    assert!(matches!(err, CaptureError::Filter { filter, .. } if filter == "host and and"));
}

#[test]
fn unknown_link_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_raw(dir.path(), "user0.pcap", &pcap_bytes(147, &[]));
    let err = PacketReader::open(&path, "").err().unwrap();
    assert!(matches!(err, CaptureError::UnsupportedLinktype(147)));
}

#[test]
fn engine_counts_over_reader() {
    let fixture = write_capture(
        LINKTYPE_ETHERNET,
        &[
            (5.0, Frame::Tcp { src: DNS, sport: 443, dst: CLIENT, dport: 6000 }),
            (4.0, Frame::Tcp { src: CLIENT, sport: 6000, dst: DNS, dport: 443 }),
        ],
    );
    let reader = PacketReader::open(&fixture.path, "").unwrap();
    let mut table = FlowTable::new(IpAddr::from(CLIENT));
    let stats = build_flows(reader, &mut table).unwrap();

    assert_eq!(stats.flow_count, 1);
    let flow = table.flows().next().unwrap();
    // the reply came first in the file, orientation still follows the client ip
    assert_eq!(flow.client, ep(CLIENT, 6000));
    assert_eq!(flow.start_time, 4.0);
    assert_eq!(flow.end_time, 5.0);
}

#[test]
fn snaplen_truncated_capture_still_builds_flows() {
    let records = vec![
        (7.0, Frame::Tcp { src: CLIENT, sport: 5000, dst: DNS, dport: 443 }.bytes()),
        (7.5, Frame::Tcp { src: DNS, sport: 443, dst: CLIENT, dport: 5000 }.bytes()),
    ];
    // ethernet + ipv4 + tcp headers, payload cut off
    let dir = tempfile::tempdir().unwrap();
    let path = write_raw(dir.path(), "snapped.pcap", &pcap_bytes_snapped(LINKTYPE_ETHERNET, 54, &records));

    let (table, stats) = flowtrace::load_flows(&config(&path, "")).unwrap();

    assert_eq!(stats.packets_seen, 2);
    assert_eq!(stats.packets_skipped, 0);
    assert_eq!(table.len(), 1);
    let flow = table.flows().next().unwrap();
    assert_eq!(flow.client, ep(CLIENT, 5000));
    assert_eq!(flow.server, ep(DNS, 443));
    // wire length, not captured length
    assert_eq!(flow.bytes(), 2 * records[0].1.len() as u64);
}
