//! SCION 握手追踪
//!
//! 在仿真覆盖网络上放两台主机，客户端沿指定路径发起一次 TCP 握手，
//! 打印每次交付的处理结果，可选写出结构化追踪 JSON。

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use scion_ip::addr::{FirstHop, ScionAddr};
use scion_ip::ip::{IpConfig, ScionFlags, ScionInput, ScionOutput, SocketOptions};
use scion_ip::overlay::{SimOverlay, SimPort, SimTime};
use scion_ip::packet::{HopField, INFO_UP, InfoField, Path, PathSegment};
use scion_ip::tcp::{ConnState, Handshaker};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "scion-trace", about = "SCION 握手追踪：两台仿真主机之间完成一次 TCP 三次握手")]
struct Args {
    /// 客户端 SCION 地址
    #[arg(long, default_value = "1-11,[10.0.0.1]")]
    src: String,
    /// 服务端 SCION 地址
    #[arg(long, default_value = "2-22,[10.0.0.2]")]
    dst: String,
    #[arg(long, default_value_t = 40_000)]
    src_port: u16,
    #[arg(long, default_value_t = 80)]
    dst_port: u16,
    /// 路径段数（0 表示空路径）
    #[arg(long, default_value_t = 1)]
    segments: u8,
    /// 每段的跳数
    #[arg(long, default_value_t = 3)]
    hops: u8,
    /// SYN 携带单跳路径扩展
    #[arg(long, default_value_t = false)]
    one_hop: bool,
    /// 覆盖网络单向时延（微秒）
    #[arg(long, default_value_t = 10)]
    latency_us: u64,
    #[arg(long, default_value = "127.0.0.1:31000")]
    client_overlay: SocketAddr,
    #[arg(long, default_value = "127.0.0.2:31000")]
    server_overlay: SocketAddr,
    /// 网络层配置（JSON）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 输出追踪事件 JSON
    #[arg(long)]
    trace_json: Option<PathBuf>,
}

fn build_path(segments: u8, hops: u8, isd: u16, first_hop: FirstHop) -> Path {
    if segments == 0 || hops == 0 {
        return Path::empty(first_hop);
    }
    let segs: Vec<PathSegment> = (0..segments)
        .map(|s| PathSegment {
            info: InfoField {
                flags: if s == 0 { INFO_UP } else { 0 },
                timestamp: 0,
                isd,
                hops,
            },
            hops: (0..hops)
                .map(|h| {
                    let ifid = u16::from(s) * 100 + u16::from(h);
                    HopField {
                        flags: 0,
                        exp_time: 63,
                        ingress: ifid,
                        egress: ifid + 1,
                        mac: [s, h, 0xab],
                    }
                })
                .collect(),
        })
        .collect();
    Path::from_segments(&segs, first_hop).expect("build path")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).expect("read ip config");
            IpConfig::from_json_str(&raw).expect("parse ip config")
        }
        None => IpConfig::default(),
    };
    debug!(?cfg, "网络层配置");

    let src: ScionAddr = args.src.parse().expect("parse --src");
    let dst: ScionAddr = args.dst.parse().expect("parse --dst");
    let client_hop = FirstHop(args.client_overlay);
    let server_hop = FirstHop(args.server_overlay);

    let mut client = Handshaker::new(
        src,
        ScionOutput::new(SimPort::new(client_hop), cfg.clone()),
    );
    let mut server = Handshaker::new(
        dst,
        ScionOutput::new(SimPort::new(server_hop), cfg.clone()),
    );
    server.listen(args.dst_port, SocketOptions::KEEPALIVE, ScionFlags::NONE);

    let path = build_path(args.segments, args.hops, src.isd_as.isd(), server_hop);
    let flags = if args.one_hop {
        ScionFlags::ONE_HOP_PATH
    } else {
        ScionFlags::NONE
    };
    info!(%src, %dst, path_len = path.len(), one_hop = args.one_hop, "客户端发起连接");
    client
        .connect(dst, args.src_port, args.dst_port, path, flags)
        .expect("send SYN");

    let mut overlay = SimOverlay::new(SimTime::from_micros(args.latency_us));
    if args.trace_json.is_some() {
        overlay = overlay.with_trace();
    }
    overlay.add_host("client", client_hop, ScionInput::new(cfg.clone()), client);
    overlay.add_host("server", server_hop, ScionInput::new(cfg), server);

    let deliveries = overlay.run();
    for (id, res) in &deliveries {
        let name = overlay.host(*id).map_or("?", |h| h.name.as_str());
        match res {
            Ok(Ok(event)) => println!("tcp_input host={name} event={event:?}"),
            Ok(Err(e)) => println!("tcp_error host={name} error={e}"),
            Err(e) => println!("ingress_drop host={name} reason={e}"),
        }
    }

    let established = overlay
        .hosts()
        .iter()
        .flat_map(|h| h.tcp.connections())
        .filter(|c| c.state == ConnState::Established)
        .count();
    let stats = overlay.stats();
    println!(
        "done @ {:?}, frames_sent={}, frames_delivered={}, bytes_delivered={}, ingress_drops={}, established={}",
        overlay.now(),
        stats.frames_sent,
        stats.frames_delivered,
        stats.bytes_delivered,
        stats.ingress_drops,
        established
    );

    if let Some(path) = args.trace_json {
        if let Some(trace) = overlay.take_trace() {
            let json = trace.to_json_pretty().expect("serialize trace events");
            fs::write(&path, json).expect("write trace json");
            eprintln!("wrote trace events to {}", path.display());
        }
    }
}
