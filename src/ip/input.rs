//! 入口适配器
//!
//! 覆盖网络帧（首跳前缀 + SCION 报文）→ 解析 → 构造 [`PathState`] →
//! 把传输层段交给 TCP 引擎。解析出的报文和路径状态在返回前全部释放。

use bytes::Bytes;
use tracing::{debug, trace};

use super::{IpConfig, IpError, PathState};
use crate::overlay::split_frame;
use crate::packet::{Codec, Path, ScionCodec};

/// 入口网络接口编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NetifId(pub usize);

/// TCP 引擎的输入接口
pub trait TcpInput {
    type Outcome;

    /// 处理一个传输层段。`state` 只在本次调用期间有效。
    fn tcp_input(&mut self, segment: Bytes, inp: NetifId, state: &PathState) -> Self::Outcome;
}

#[derive(Debug, Clone, Default)]
pub struct ScionInput<C = ScionCodec> {
    codec: C,
    cfg: IpConfig,
}

impl ScionInput {
    /// 使用默认编解码器
    pub fn new(cfg: IpConfig) -> Self {
        Self::with_codec(ScionCodec, cfg)
    }
}

impl<C: Codec> ScionInput<C> {
    /// 指定编解码器
    pub fn with_codec(codec: C, cfg: IpConfig) -> Self {
        Self { codec, cfg }
    }

    pub fn config(&self) -> &IpConfig {
        &self.cfg
    }

    /// 处理一个入口帧。
    ///
    /// 帧无法解析时返回 [`IpError::Parse`]，段短于 `min_segment_len` 时返回
    /// [`IpError::TruncatedSegment`]，两种情况下都不会调用 TCP 引擎。
    #[tracing::instrument(skip(self, frame, tcp), fields(frame_len = frame.len(), inp = inp.0))]
    pub fn on_frame_received<T: TcpInput>(
        &self,
        frame: Bytes,
        inp: NetifId,
        tcp: &mut T,
    ) -> Result<T::Outcome, IpError> {
        let (first_hop, packet) = split_frame(frame).map_err(IpError::Parse)?;
        let packet = self.codec.parse(packet).map_err(IpError::Parse)?;
        trace!(
            src = %packet.src,
            dst = %packet.dst,
            path_len = packet.path.len(),
            exts = packet.extensions.len(),
            "解析入口报文"
        );

        let path = if packet.has_path() {
            let raw = self.codec.reverse_path(&packet.path).map_err(IpError::Parse)?;
            Path::new(raw, first_hop)
        } else {
            Path::empty(first_hop)
        };

        let segment = packet.l4.payload.clone();
        if segment.len() < self.cfg.min_segment_len {
            debug!(len = segment.len(), min = self.cfg.min_segment_len, "传输层段过短，丢弃");
            return Err(IpError::TruncatedSegment {
                len: segment.len(),
                min: self.cfg.min_segment_len,
            });
        }

        let state = PathState::new(packet.src, packet.dst, path, packet.extensions);
        debug!(
            src = %state.current_src(),
            has_path = state.has_path(),
            seg_len = segment.len(),
            "交给 TCP 引擎"
        );
        Ok(tcp.tcp_input(segment, inp, &state))
    }
}
