//! 协议控制块的网络层公共部分

use std::ops::{BitAnd, BitOr};

use super::{PathState, ScionFlags};
use crate::addr::ScionAddr;
use crate::packet::{Extension, Path};

/// 套接字选项位（`SOF_*`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SocketOptions(pub u8);

impl SocketOptions {
    pub const NONE: SocketOptions = SocketOptions(0);
    /// 已调用 listen()
    pub const ACCEPTCONN: SocketOptions = SocketOptions(0x02);
    pub const REUSEADDR: SocketOptions = SocketOptions(0x04);
    pub const KEEPALIVE: SocketOptions = SocketOptions(0x08);
    pub const BROADCAST: SocketOptions = SocketOptions(0x20);
    /// 关闭时若仍有数据则等待
    pub const LINGER: SocketOptions = SocketOptions(0x80);
    /// 监听 PCB 派生新连接时继承的选项
    pub const INHERITED: SocketOptions = SocketOptions(0x04 | 0x08 | 0x80);

    pub fn contains(self, other: SocketOptions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SocketOptions {
    type Output = SocketOptions;

    fn bitor(self, rhs: SocketOptions) -> SocketOptions {
        SocketOptions(self.0 | rhs.0)
    }
}

impl BitAnd for SocketOptions {
    type Output = SocketOptions;

    fn bitand(self, rhs: SocketOptions) -> SocketOptions {
        SocketOptions(self.0 & rhs.0)
    }
}

/// 所有传输层 PCB 共有的网络层字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpPcb {
    pub local: ScionAddr,
    pub remote: ScionAddr,
    pub so_options: SocketOptions,
    pub path: Path,
    pub extensions: Vec<Extension>,
    /// SVC 地址（0 表示未设置）
    pub svc: u16,
    pub scion_flags: ScionFlags,
}

impl IpPcb {
    /// 选项、SVC 和标志均为空
    pub fn new(local: ScionAddr, remote: ScionAddr, path: Path) -> Self {
        Self {
            local,
            remote,
            so_options: SocketOptions::NONE,
            path,
            extensions: Vec::new(),
            svc: 0,
            scion_flags: ScionFlags::NONE,
        }
    }

    pub fn get_option(&self, opt: SocketOptions) -> bool {
        self.so_options.contains(opt)
    }

    /// 置位选项
    pub fn set_option(&mut self, opt: SocketOptions) {
        self.so_options = self.so_options | opt;
    }

    /// 清除选项
    pub fn reset_option(&mut self, opt: SocketOptions) {
        self.so_options = SocketOptions(self.so_options.0 & !opt.0);
    }

    /// 采用入口报文的回程路径（复用已有的路径缓冲区）。入口扩展不会带到出口。
    pub fn adopt_path(&mut self, state: &PathState) {
        self.path.copy_from(state.path());
    }

    /// 从监听 PCB 继承选项和 SCION 标志。
    pub fn inherit_from(&mut self, listener: &IpPcb) {
        self.so_options = listener.so_options & SocketOptions::INHERITED;
        self.scion_flags = listener.scion_flags;
        self.svc = listener.svc;
    }
}
