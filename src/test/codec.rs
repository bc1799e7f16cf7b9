use bytes::Bytes;

use super::{hop_field, overlay_hop, packet_bytes, sample_path, v4, v6};
use crate::addr::{AddrError, HostAddr, IsdAs, ScionAddr};
use crate::packet::{
    Codec, END_TO_END, ExtClass, Extension, HOP_BY_HOP, InfoField, L4Payload, Packet, PacketError, Path,
    PathSegment, ScionCodec,
};

fn e2e_ext() -> Extension {
    // 3 + 13 bytes: exactly two lines, no padding.
    Extension::new(ExtClass::EndToEnd, 7, &b"thirteen-byte"[..])
}

#[test]
fn build_serialize_parse_keeps_every_part() {
    let src = v4(1, 11, [10, 0, 0, 1]);
    let dst = v4(2, 22, [10, 0, 0, 2]);
    let path = sample_path(&[3], overlay_hop(2, 31000));
    let exts = vec![Extension::one_hop_path(), e2e_ext()];
    let l4: Vec<u8> = (0..24).collect();

    let codec = ScionCodec;
    let pkt = codec
        .build(&dst, &src, &path, &exts, L4Payload::new(6, l4.clone()))
        .unwrap();
    // 8 common + 16 address + 32 path, 8 + 16 extensions, 24 payload.
    assert_eq!(pkt.header.header_len, 7);
    assert_eq!(pkt.header.total_len, 104);
    assert_eq!(pkt.wire_len(), 104);
    assert_eq!(pkt.header.next_header, HOP_BY_HOP);

    let mut buf = vec![0u8; 104];
    assert_eq!(codec.serialize(&pkt, &mut buf).unwrap(), 104);
    codec.recompute_offsets(&mut buf).unwrap();

    let parsed = codec.parse(Bytes::from(buf)).unwrap();
    assert_eq!(parsed.src, src);
    assert_eq!(parsed.dst, dst);
    assert_eq!(&parsed.path[..], path.raw());
    assert_eq!(parsed.extensions, exts);
    assert_eq!(parsed.l4.proto, 6);
    assert_eq!(&parsed.l4.payload[..], &l4[..]);
    assert_eq!(parsed.header.current_iof, 3);
    assert_eq!(parsed.header.current_hof, 4);
}

#[test]
fn extension_chain_layout_on_the_wire() {
    let src = v4(1, 11, [10, 0, 0, 1]);
    let dst = v4(2, 22, [10, 0, 0, 2]);
    let path = sample_path(&[3], overlay_hop(2, 31000));
    let buf = packet_bytes(
        &src,
        &dst,
        &path,
        &[Extension::one_hop_path(), e2e_ext()],
        6,
        &[0xee; 4],
    );
    assert_eq!(buf[7], HOP_BY_HOP);
    assert_eq!(&buf[56..64], &[END_TO_END, 0, 2, 0, 0, 0, 0, 0]);
    assert_eq!(&buf[64..67], &[6, 1, 7]);
    assert_eq!(&buf[67..80], b"thirteen-byte");
    assert_eq!(&buf[80..], &[0xee; 4]);
}

#[test]
fn short_extension_payload_is_zero_padded() {
    let src = v4(1, 11, [10, 0, 0, 1]);
    let dst = v4(2, 22, [10, 0, 0, 2]);
    let ext = Extension::new(ExtClass::EndToEnd, 9, &b"abc"[..]);
    assert_eq!(ext.wire_len(), 8);
    let buf = packet_bytes(&src, &dst, &Path::empty(overlay_hop(2, 1)), &[ext], 6, &[1; 20]);
    assert_eq!(&buf[24..32], &[6, 0, 9, b'a', b'b', b'c', 0, 0]);

    let parsed = ScionCodec.parse(Bytes::from(buf)).unwrap();
    assert_eq!(&parsed.extensions[0].payload[..], &[b'a', b'b', b'c', 0, 0]);
    assert_eq!(parsed.l4.len(), 20);
}

#[test]
fn address_header_pads_variable_host_lengths() {
    let empty = Path::empty(overlay_hop(2, 1));
    let cases = [
        (v6(1, 11, "fd00::1"), v6(2, 22, "fd00::2"), 48),
        (v4(1, 11, [10, 0, 0, 1]), v6(2, 22, "fd00::2"), 40),
        (
            v4(1, 11, [10, 0, 0, 1]),
            ScionAddr::new(IsdAs::new(2, 22).unwrap(), HostAddr::svc(1)),
            24,
        ),
    ];
    for (src, dst, header_bytes) in cases {
        let buf = packet_bytes(&src, &dst, &empty, &[], 6, &[0; 20]);
        assert_eq!(usize::from(buf[4]) * 8, header_bytes, "{src} -> {dst}");
        assert_eq!(buf.len(), header_bytes + 20);
        let parsed = ScionCodec.parse(Bytes::from(buf)).unwrap();
        assert_eq!((parsed.src, parsed.dst), (src, dst));
        assert!(!parsed.has_path());
        assert_eq!((parsed.header.current_iof, parsed.header.current_hof), (0, 0));
    }
}

#[test]
fn recompute_offsets_skips_verify_only_hop_fields() {
    let src = v4(1, 11, [10, 0, 0, 1]);
    let dst = v4(2, 22, [10, 0, 0, 2]);
    let seg = PathSegment {
        info: InfoField::default(),
        hops: vec![
            hop_field(1, 2, true),
            hop_field(2, 3, false),
            hop_field(3, 4, false),
        ],
    };
    let path = Path::from_segments(&[seg], overlay_hop(2, 1)).unwrap();
    let buf = packet_bytes(&src, &dst, &path, &[], 6, &[0; 20]);
    assert_eq!(buf[5], 3);
    assert_eq!(buf[6], 5);
}

#[test]
fn parse_rejects_length_disagreement() {
    let src = v4(1, 11, [10, 0, 0, 1]);
    let dst = v4(2, 22, [10, 0, 0, 2]);
    let mut buf = packet_bytes(&src, &dst, &sample_path(&[3], overlay_hop(2, 1)), &[], 6, &[0; 20]);
    let declared = buf.len();
    buf.push(0);
    assert_eq!(
        ScionCodec.parse(Bytes::from(buf)),
        Err(PacketError::LengthMismatch {
            declared,
            actual: declared + 1
        })
    );
}

fn parse_edited(good: &[u8], edit: fn(&mut Vec<u8>)) -> Result<Packet, PacketError> {
    let mut buf = good.to_vec();
    edit(&mut buf);
    ScionCodec.parse(Bytes::from(buf))
}

#[test]
fn parse_rejects_malformed_headers() {
    let src = v4(1, 11, [10, 0, 0, 1]);
    let dst = v4(2, 22, [10, 0, 0, 2]);
    let good = packet_bytes(
        &src,
        &dst,
        &sample_path(&[3], overlay_hop(2, 1)),
        &[Extension::one_hop_path()],
        6,
        &[],
    );
    assert_eq!(good.len(), 64);
    let parse = |edit: fn(&mut Vec<u8>)| parse_edited(&good, edit);

    assert_eq!(parse(|b| b[0] |= 0x10), Err(PacketError::UnsupportedVersion(1)));
    assert_eq!(
        parse(|b| b[4] = 2),
        Err(PacketError::InvalidHeaderLength {
            advertised: 16,
            minimum: 24
        })
    );
    assert_eq!(
        parse(|b| b[4] = 200),
        Err(PacketError::BufferTooSmall {
            at: "path",
            required: 1600,
            actual: 64
        })
    );
    assert_eq!(
        parse(|b| b[..2].copy_from_slice(&((5u16 << 6) | 1).to_be_bytes())),
        Err(PacketError::Addr(AddrError::UnknownHostType(5)))
    );
    assert_eq!(parse(|b| b[31] = 0), Err(PacketError::EmptySegment { offset: 0 }));
    assert_eq!(
        parse(|b| b[57] = 3),
        Err(PacketError::TruncatedExtension {
            offset: 56,
            required: 32,
            actual: 8
        })
    );
    assert!(matches!(
        ScionCodec.parse(Bytes::from_static(&[0; 5])),
        Err(PacketError::BufferTooSmall { .. })
    ));
}

#[test]
fn serialize_rejects_inconsistent_total_length() {
    let src = v4(1, 11, [10, 0, 0, 1]);
    let dst = v4(2, 22, [10, 0, 0, 2]);
    let codec = ScionCodec;
    let mut pkt = codec
        .build(
            &dst,
            &src,
            &sample_path(&[2], overlay_hop(2, 1)),
            &[],
            L4Payload::new(6, vec![0u8; 20]),
        )
        .unwrap();
    let total = usize::from(pkt.header.total_len);

    let mut small = vec![0u8; total - 1];
    assert_eq!(
        codec.serialize(&pkt, &mut small),
        Err(PacketError::BufferTooSmall {
            at: "output",
            required: total,
            actual: total - 1
        })
    );

    pkt.header.total_len += 8;
    let mut buf = vec![0u8; total + 8];
    assert_eq!(
        codec.serialize(&pkt, &mut buf),
        Err(PacketError::LengthMismatch {
            declared: total + 8,
            actual: total
        })
    );
}

#[test]
fn build_rejects_oversized_parts() {
    let src = v4(1, 11, [10, 0, 0, 1]);
    let dst = v4(2, 22, [10, 0, 0, 2]);
    let empty = Path::empty(overlay_hop(2, 1));
    let big_ext = Extension::new(ExtClass::HopByHop, 1, vec![0u8; 2048]);
    assert_eq!(
        ScionCodec
            .build(&dst, &src, &empty, &[big_ext], L4Payload::new(6, vec![0u8; 20]))
            .unwrap_err(),
        PacketError::ExtensionTooLarge(2048)
    );
    assert_eq!(
        ScionCodec
            .build(&dst, &src, &empty, &[], L4Payload::new(6, vec![0u8; 70_000]))
            .unwrap_err(),
        PacketError::TooLarge(70_024)
    );
}
