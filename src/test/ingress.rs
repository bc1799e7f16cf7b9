use bytes::Bytes;

use super::{overlay_hop, packet_bytes, sample_path, v4, v6};
use crate::addr::FirstHop;
use crate::ip::{IpConfig, IpError, NetifId, PathState, ScionInput, TcpInput};
use crate::overlay::encode_frame;
use crate::packet::{ExtClass, Extension, PacketError, Path, reverse_path};

/// Records every call; the outcome is the number of calls so far.
#[derive(Default)]
struct Recorder {
    calls: Vec<(Bytes, NetifId, PathState)>,
}

impl TcpInput for Recorder {
    type Outcome = usize;

    fn tcp_input(&mut self, segment: Bytes, inp: NetifId, state: &PathState) -> usize {
        self.calls.push((segment, inp, state.clone()));
        self.calls.len()
    }
}

fn tcp_like_segment() -> Vec<u8> {
    (0u8..32).collect()
}

fn frame(from: FirstHop, path: &Path, exts: &[Extension], l4: &[u8]) -> Bytes {
    let packet = packet_bytes(
        &v4(1, 11, [10, 0, 0, 1]),
        &v4(2, 22, [10, 0, 0, 2]),
        path,
        exts,
        6,
        l4,
    );
    encode_frame(&from, &packet)
}

#[test]
fn frame_with_path_reaches_tcp_with_reversed_path() {
    let input = ScionInput::new(IpConfig::default());
    let mut tcp = Recorder::default();
    let from = overlay_hop(1, 31000);
    let path = sample_path(&[2, 3], overlay_hop(2, 31000));
    let exts = vec![
        Extension::one_hop_path(),
        Extension::new(ExtClass::EndToEnd, 4, &b"e2e-option-13"[..]),
    ];
    let seg = tcp_like_segment();

    let out = input
        .on_frame_received(frame(from, &path, &exts, &seg), NetifId(3), &mut tcp)
        .unwrap();
    assert_eq!(out, 1);

    let (segment, inp, state) = &tcp.calls[0];
    assert_eq!(&segment[..], &seg[..]);
    assert_eq!(*inp, NetifId(3));
    assert_eq!(state.current_src(), &v4(1, 11, [10, 0, 0, 1]));
    assert_eq!(state.current_dest(), &v4(2, 22, [10, 0, 0, 2]));
    assert!(state.has_path());
    assert_eq!(state.path().raw(), &reverse_path(path.raw()).unwrap()[..]);
    assert_eq!(state.path().first_hop(), &from);
    assert_eq!(state.extensions(), &exts[..]);
}

#[test]
fn path_state_is_per_call() {
    let input = ScionInput::new(IpConfig::default());
    let mut tcp = Recorder::default();
    let seg = tcp_like_segment();

    let a = sample_path(&[3], overlay_hop(2, 1));
    input
        .on_frame_received(frame(overlay_hop(1, 1), &a, &[], &seg), NetifId(0), &mut tcp)
        .unwrap();
    input
        .on_frame_received(
            frame(overlay_hop(5, 5), &Path::empty(overlay_hop(2, 1)), &[], &seg),
            NetifId(0),
            &mut tcp,
        )
        .unwrap();

    let first = &tcp.calls[0].2;
    let second = &tcp.calls[1].2;
    assert_eq!(first.path().len(), a.len());
    assert_eq!(second.path().len(), 0);
    assert!(!second.has_path());
    assert_eq!(second.path().first_hop(), &overlay_hop(5, 5));
    assert!(second.extensions().is_empty());
}

#[test]
fn length_disagreement_is_a_parse_error_and_tcp_is_not_called() {
    let input = ScionInput::new(IpConfig::default());
    let mut tcp = Recorder::default();
    let good = frame(
        overlay_hop(1, 1),
        &sample_path(&[2], overlay_hop(2, 1)),
        &[],
        &tcp_like_segment(),
    );
    let mut bad = good.to_vec();
    bad.extend_from_slice(&[0; 4]);

    let err = input
        .on_frame_received(Bytes::from(bad), NetifId(0), &mut tcp)
        .unwrap_err();
    assert!(matches!(
        err,
        IpError::Parse(PacketError::LengthMismatch { .. })
    ));
    assert!(tcp.calls.is_empty());
}

#[test]
fn frame_shorter_than_prefix_is_rejected() {
    let input = ScionInput::new(IpConfig::default());
    let mut tcp = Recorder::default();
    let err = input
        .on_frame_received(Bytes::from_static(&[1; 7]), NetifId(0), &mut tcp)
        .unwrap_err();
    assert!(matches!(err, IpError::Parse(PacketError::Addr(_))));
    assert!(tcp.calls.is_empty());
}

#[test]
fn segment_shorter_than_tcp_header_is_dropped() {
    let input = ScionInput::new(IpConfig::default());
    let mut tcp = Recorder::default();
    let f = frame(overlay_hop(1, 1), &Path::empty(overlay_hop(2, 1)), &[], &[0; 10]);
    let err = input.on_frame_received(f.clone(), NetifId(0), &mut tcp).unwrap_err();
    assert!(matches!(err, IpError::TruncatedSegment { len: 10, min: 20 }));
    assert!(tcp.calls.is_empty());

    let lenient = ScionInput::new(IpConfig {
        min_segment_len: 0,
        ..IpConfig::default()
    });
    assert_eq!(lenient.on_frame_received(f, NetifId(0), &mut tcp).unwrap(), 1);
}

#[test]
fn concurrent_adapters_do_not_share_state() {
    let input = ScionInput::new(IpConfig::default());
    let seg = tcp_like_segment();
    let with_path = frame(overlay_hop(1, 1), &sample_path(&[4], overlay_hop(2, 1)), &[], &seg);
    let without = frame(overlay_hop(3, 3), &Path::empty(overlay_hop(2, 1)), &[], &seg);

    let (a, b) = std::thread::scope(|s| {
        let ha = s.spawn(|| {
            let mut tcp = Recorder::default();
            for _ in 0..50 {
                input
                    .on_frame_received(with_path.clone(), NetifId(0), &mut tcp)
                    .unwrap();
            }
            tcp
        });
        let hb = s.spawn(|| {
            let mut tcp = Recorder::default();
            for _ in 0..50 {
                input
                    .on_frame_received(without.clone(), NetifId(1), &mut tcp)
                    .unwrap();
            }
            tcp
        });
        (ha.join().unwrap(), hb.join().unwrap())
    });
    assert!(a.calls.iter().all(|(_, _, st)| st.path().len() == 40));
    assert!(b.calls.iter().all(|(_, _, st)| st.path().is_empty()));
}

#[test]
fn ipv6_hosts_are_carried_into_path_state() {
    let input = ScionInput::new(IpConfig::default());
    let mut tcp = Recorder::default();
    let src = v6(1, 11, "fd00::1");
    let dst = v6(2, 22, "fd00::2");
    let packet = packet_bytes(&src, &dst, &Path::empty(overlay_hop(2, 1)), &[], 6, &[0; 20]);
    input
        .on_frame_received(encode_frame(&overlay_hop(1, 1), &packet), NetifId(0), &mut tcp)
        .unwrap();
    assert_eq!(tcp.calls[0].2.current_src(), &src);
    assert_eq!(tcp.calls[0].2.current_dest(), &dst);
}
