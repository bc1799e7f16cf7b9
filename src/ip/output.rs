//! 出口适配器
//!
//! TCP 段 + 地址/路径/扩展 → 构造 SCION 报文 → 序列化 → 重算 IOF/HOF →
//! 交给覆盖网络。带 [`ScionFlags::ONE_HOP_PATH`] 的纯 SYN 段会在扩展列表最前面
//! 插入单跳路径扩展。

use std::ops::BitOr;

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use super::{IpConfig, IpError};
use crate::addr::ScionAddr;
use crate::overlay::OverlaySend;
use crate::packet::{Codec, Extension, L4Payload, Path, ScionCodec, with_one_hop_path};
use crate::tcp;

/// 每个连接的 SCION 发送标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScionFlags(pub u8);

impl ScionFlags {
    pub const NONE: ScionFlags = ScionFlags(0);
    /// 首个 SYN 走单跳路径（由第一个边界路由器补全）
    pub const ONE_HOP_PATH: ScionFlags = ScionFlags(0x01);

    pub fn contains(self, other: ScionFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ScionFlags {
    type Output = ScionFlags;

    fn bitor(self, rhs: ScionFlags) -> ScionFlags {
        ScionFlags(self.0 | rhs.0)
    }
}

/// 出口适配器：发送函数在构造时注入。
#[derive(Debug)]
pub struct ScionOutput<O, C = ScionCodec> {
    overlay: O,
    codec: C,
    cfg: IpConfig,
}

impl<O: OverlaySend> ScionOutput<O> {
    /// 使用默认编解码器
    pub fn new(overlay: O, cfg: IpConfig) -> Self {
        Self::with_codec(overlay, ScionCodec, cfg)
    }
}

impl<O: OverlaySend, C: Codec> ScionOutput<O, C> {
    /// 指定编解码器（测试中用于注入故障）
    pub fn with_codec(overlay: O, codec: C, cfg: IpConfig) -> Self {
        Self {
            overlay,
            codec,
            cfg,
        }
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    /// 底层覆盖网络，例如取走仿真发件箱
    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    pub fn config(&self) -> &IpConfig {
        &self.cfg
    }

    /// 发送一个传输层段，返回交给覆盖网络的字节数。
    ///
    /// `segment` 按值传入：调用方交出唯一所有权。`extensions` 不会被修改，
    /// 单跳路径扩展只插入到本次发送使用的新列表中。
    #[tracing::instrument(
        skip(self, segment, path, extensions),
        fields(seg_len = segment.len(), path_len = path.len(), src = %src, dst = %dst)
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn send_segment(
        &mut self,
        segment: BytesMut,
        src: &ScionAddr,
        dst: &ScionAddr,
        path: &Path,
        extensions: &[Extension],
        proto: u8,
        flags: ScionFlags,
    ) -> Result<usize, IpError> {
        let injected;
        let exts = if flags.contains(ScionFlags::ONE_HOP_PATH) && tcp::is_syn_only(&segment) {
            debug!("SYN 段，插入单跳路径扩展");
            injected = with_one_hop_path(extensions);
            &injected[..]
        } else {
            extensions
        };

        let packet = self
            .codec
            .build(dst, src, path, exts, L4Payload::new(proto, segment.freeze()))
            .map_err(IpError::Serialize)?;

        let total = usize::from(packet.header.total_len);
        let mut buf = Vec::new();
        buf.try_reserve_exact(total)?;
        buf.resize(total, 0);

        let written = self
            .codec
            .serialize(&packet, &mut buf)
            .map_err(IpError::Serialize)?;
        buf.truncate(written);
        self.codec
            .recompute_offsets(&mut buf)
            .map_err(IpError::Serialize)?;
        trace!(total, exts = exts.len(), "报文已序列化");

        if buf.len() > self.cfg.mtu {
            warn!(len = buf.len(), mtu = self.cfg.mtu, "报文超过 MTU");
        }

        let sent = self.overlay.send(&buf, path.first_hop())?;
        debug!(sent, next_hop = %path.first_hop(), "报文已交给覆盖网络");
        Ok(sent)
    }
}
