//! 入口报文的路径状态（每次调用一份）

use crate::addr::ScionAddr;
use crate::packet::{Extension, Path};

/// 当前交给 TCP 引擎的报文的地址、回程路径和扩展。
///
/// 由入口适配器为每个帧新建，只在对应的 `tcp_input` 调用期间被借用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathState {
    src: ScionAddr,
    dst: ScionAddr,
    path: Path,
    extensions: Vec<Extension>,
}

impl PathState {
    pub fn new(src: ScionAddr, dst: ScionAddr, path: Path, extensions: Vec<Extension>) -> Self {
        Self {
            src,
            dst,
            path,
            extensions,
        }
    }

    /// 报文的源地址（对端）
    pub fn current_src(&self) -> &ScionAddr {
        &self.src
    }

    /// 报文的目的地址（本端）
    pub fn current_dest(&self) -> &ScionAddr {
        &self.dst
    }

    /// 回程路径：入口报文路径的反转；报文没有路径时为空路径，
    /// 首跳为帧前缀中的发送方。
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 入口报文携带的扩展
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// 入口报文是否带路径（无路径时首跳即对端）
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }
}
