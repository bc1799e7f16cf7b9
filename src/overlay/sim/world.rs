//! 仿真覆盖网络主体
//!
//! 主机按首跳地址注册；每台主机拥有一个入口适配器、一个 TCP 引擎，
//! TCP 引擎内部通过 [`SimPort`] 发件箱发送。每次交付后清空所有发件箱，
//! 把新报文按固定时延调度进事件队列。

use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use tracing::{debug, info, trace, warn};

use super::{InFlight, SimPort, SimTime};
use crate::addr::{FIRST_HOP_LEN, FirstHop};
use crate::ip::{IpError, NetifId, ScionInput, TcpInput};
use crate::overlay::{encode_frame, split_frame};
use crate::trace::{TraceEvent, TraceEventKind, TraceLogger};

/// 仿真中的一台主机
#[derive(Debug)]
pub struct SimHost<T> {
    pub name: String,
    pub first_hop: FirstHop,
    pub input: ScionInput,
    pub tcp: T,
}

/// 仿真统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimStats {
    pub frames_sent: u64,
    pub frames_delivered: u64,
    pub bytes_delivered: u64,
    pub ingress_drops: u64,
    pub unroutable: u64,
}

/// 一次交付的结果
pub type Delivery<O> = (usize, Result<O, IpError>);

pub struct SimOverlay<T> {
    now: SimTime,
    next_seq: u64,
    latency: SimTime,
    q: BinaryHeap<InFlight>,
    hosts: Vec<SimHost<T>>,
    by_addr: HashMap<FirstHop, usize>,
    stats: SimStats,
    trace: Option<TraceLogger>,
}

impl<T> SimOverlay<T>
where
    T: TcpInput + AsMut<SimPort>,
    T::Outcome: fmt::Debug,
{
    /// 创建空的仿真覆盖网络，所有帧的单向时延为 `latency`
    pub fn new(latency: SimTime) -> Self {
        Self {
            now: SimTime::ZERO,
            next_seq: 0,
            latency,
            q: BinaryHeap::new(),
            hosts: Vec::new(),
            by_addr: HashMap::new(),
            stats: SimStats::default(),
            trace: None,
        }
    }

    /// 开启结构化事件记录
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(TraceLogger::default());
        self
    }

    /// 注册主机，返回主机编号（同时作为入口的 `NetifId`）。
    pub fn add_host(
        &mut self,
        name: impl Into<String>,
        first_hop: FirstHop,
        input: ScionInput,
        tcp: T,
    ) -> usize {
        let id = self.hosts.len();
        let name = name.into();
        debug!(id, name = %name, first_hop = %first_hop, "注册仿真主机");
        self.by_addr.insert(first_hop, id);
        self.hosts.push(SimHost {
            name,
            first_hop,
            input,
            tcp,
        });
        id
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn host(&self, id: usize) -> Option<&SimHost<T>> {
        self.hosts.get(id)
    }

    pub fn host_mut(&mut self, id: usize) -> Option<&mut SimHost<T>> {
        self.hosts.get_mut(id)
    }

    pub fn hosts(&self) -> &[SimHost<T>] {
        &self.hosts
    }

    /// 尚未交付的帧数
    pub fn in_flight(&self) -> usize {
        self.q.len()
    }

    pub fn trace(&self) -> Option<&TraceLogger> {
        self.trace.as_ref()
    }

    /// 取走已记录的事件
    pub fn take_trace(&mut self) -> Option<TraceLogger> {
        self.trace.take()
    }

    fn record(&mut self, host: Option<usize>, bytes: usize, kind: TraceEventKind) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(TraceEvent {
                t_ns: self.now.as_nanos(),
                host,
                bytes,
                kind,
            });
        }
    }

    /// 取走所有主机发件箱里的报文，调度为 `now + latency` 到达。
    pub fn flush(&mut self) {
        let at = self.now + self.latency;
        for id in 0..self.hosts.len() {
            let host = &mut self.hosts[id];
            let from = host.first_hop;
            let outbox = host.tcp.as_mut().take_outbox();
            for (packet, to) in outbox {
                let seq = self.next_seq;
                self.next_seq = self.next_seq.wrapping_add(1);
                trace!(from = %from, to = %to, seq, bytes = packet.len(), "调度帧");
                self.stats.frames_sent += 1;
                self.record(
                    Some(id),
                    packet.len(),
                    TraceEventKind::FrameSent {
                        from: from.to_string(),
                        to: to.to_string(),
                    },
                );
                self.q.push(InFlight {
                    at,
                    seq,
                    to,
                    frame: encode_frame(&from, &packet),
                });
            }
        }
    }

    fn deliver(&mut self, item: InFlight) -> Option<Delivery<T::Outcome>> {
        self.now = item.at;
        let Some(&id) = self.by_addr.get(&item.to) else {
            warn!(to = %item.to, "目标首跳没有注册主机，丢弃");
            self.stats.unroutable += 1;
            self.record(
                None,
                item.frame.len(),
                TraceEventKind::Unroutable {
                    to: item.to.to_string(),
                },
            );
            return None;
        };

        let bytes = item.frame.len().saturating_sub(FIRST_HOP_LEN);
        let from = split_frame(item.frame.clone())
            .map(|(fh, _)| fh.to_string())
            .unwrap_or_default();
        self.stats.frames_delivered += 1;
        self.stats.bytes_delivered += bytes as u64;
        self.record(Some(id), bytes, TraceEventKind::FrameDelivered { from });

        let host = &mut self.hosts[id];
        let res = host
            .input
            .on_frame_received(item.frame, NetifId(id), &mut host.tcp);
        match &res {
            Ok(outcome) => {
                debug!(host = id, ?outcome, "TCP 引擎处理完成");
                let outcome = format!("{outcome:?}");
                self.record(Some(id), bytes, TraceEventKind::TcpInput { outcome });
            }
            Err(e) => {
                debug!(host = id, error = %e, "入口丢弃");
                self.stats.ingress_drops += 1;
                self.record(
                    Some(id),
                    bytes,
                    TraceEventKind::IngressDrop {
                        reason: e.to_string(),
                    },
                );
            }
        }
        self.flush();
        Some((id, res))
    }

    /// 运行直到队列为空或下一帧晚于 `until`。
    pub fn run_until(&mut self, until: SimTime) -> Vec<Delivery<T::Outcome>> {
        self.flush();
        let mut out = Vec::new();
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            let Some(item) = self.q.pop() else { break };
            out.extend(self.deliver(item));
        }
        self.now = self.now.max(until);
        out
    }

    /// 运行所有在途帧直到队列为空。
    #[tracing::instrument(skip(self), fields(hosts = self.hosts.len()))]
    pub fn run(&mut self) -> Vec<Delivery<T::Outcome>> {
        info!("▶️  开始运行仿真覆盖网络");
        self.flush();
        let mut out = Vec::new();
        while let Some(item) = self.q.pop() {
            trace!(now = ?self.now, at = ?item.at, seq = item.seq, remaining = self.q.len(), "交付帧");
            out.extend(self.deliver(item));
        }
        info!(
            deliveries = out.len(),
            final_time = ?self.now,
            "✅ 仿真完成"
        );
        out
    }
}

impl<T> fmt::Debug for SimOverlay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimOverlay")
            .field("now", &self.now)
            .field("hosts", &self.hosts.len())
            .field("in_flight", &self.q.len())
            .field("stats", &self.stats)
            .finish()
    }
}
