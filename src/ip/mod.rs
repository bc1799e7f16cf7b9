//! SCION 网络层适配
//!
//! 代替 TCP/IP 协议栈中的 IP 层：
//! - 入口：覆盖网络帧 → 解析 → [`PathState`] → TCP 引擎
//! - 出口：TCP 段 + 地址/路径/扩展 → 构造并序列化 SCION 报文 → 覆盖网络
//!
//! 路径状态是每次调用的上下文，只在对应的 `tcp_input` 调用期间借给 TCP 引擎。

mod config;
mod error;
mod input;
mod output;
mod path_state;
mod pcb;
mod route;

pub use config::IpConfig;
pub use error::IpError;
pub use input::{NetifId, ScionInput, TcpInput};
pub use output::{ScionFlags, ScionOutput};
pub use path_state::PathState;
pub use pcb::{IpPcb, SocketOptions};
pub use route::route;

/// 被替换的 IPv4 首部长度
pub const IP_HLEN: usize = 20;
/// 承载 SCION 的 UDP 首部长度
pub const UDP_HLEN: usize = 8;
/// 默认 MTU：以太网 1500 减去外层 IP 和 UDP 首部
pub const SCION_DEFAULT_MTU: usize = 1500 - IP_HLEN - UDP_HLEN;
pub const IP_PROTO_TCP: u8 = 6;
