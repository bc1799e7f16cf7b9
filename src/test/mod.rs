mod codec;
mod ingress;

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::addr::{FirstHop, IsdAs, ScionAddr};
use crate::packet::{
    Codec, Extension, HOP_VERIFY_ONLY, HopField, INFO_UP, InfoField, L4Payload, Path, PathSegment,
    ScionCodec,
};

fn v4(isd: u16, asn: u32, ip: [u8; 4]) -> ScionAddr {
    ScionAddr::new(IsdAs::new(isd, asn).unwrap(), Ipv4Addr::from(ip))
}

fn v6(isd: u16, asn: u32, ip: &str) -> ScionAddr {
    ScionAddr::new(IsdAs::new(isd, asn).unwrap(), ip.parse::<Ipv6Addr>().unwrap())
}

fn overlay_hop(last: u8, port: u16) -> FirstHop {
    FirstHop(SocketAddr::from((Ipv4Addr::new(127, 0, 0, last), port)))
}

fn hop_field(ingress: u16, egress: u16, verify_only: bool) -> HopField {
    HopField {
        flags: if verify_only { HOP_VERIFY_ONLY } else { 0 },
        exp_time: 63,
        ingress,
        egress,
        mac: [ingress as u8, egress as u8, 0x5a],
    }
}

/// Segments with the given hop counts; the first segment is an up segment.
fn sample_path(hops_per_segment: &[u16], first_hop: FirstHop) -> Path {
    let segments: Vec<PathSegment> = hops_per_segment
        .iter()
        .enumerate()
        .map(|(i, &hops)| PathSegment {
            info: InfoField {
                flags: if i == 0 { INFO_UP } else { 0 },
                timestamp: 1_700_000_000 + i as u32,
                isd: 1,
                hops: 0,
            },
            hops: (0..hops)
                .map(|h| hop_field(i as u16 * 10 + h, i as u16 * 10 + h + 1, false))
                .collect(),
        })
        .collect();
    Path::from_segments(&segments, first_hop).unwrap()
}

/// Serialized SCION packet built with the default codec.
fn packet_bytes(
    src: &ScionAddr,
    dst: &ScionAddr,
    path: &Path,
    extensions: &[Extension],
    proto: u8,
    l4: &[u8],
) -> Vec<u8> {
    let codec = ScionCodec;
    let pkt = codec
        .build(dst, src, path, extensions, L4Payload::new(proto, l4.to_vec()))
        .unwrap();
    let mut buf = vec![0u8; usize::from(pkt.header.total_len)];
    let n = codec.serialize(&pkt, &mut buf).unwrap();
    assert_eq!(n, buf.len());
    codec.recompute_offsets(&mut buf).unwrap();
    buf
}
