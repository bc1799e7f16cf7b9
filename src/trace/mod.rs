//! 结构化追踪事件（JSON）
//!
//! 仿真覆盖网络把帧的发送、交付、入口丢弃和 TCP 处理结果记录为事件，
//! 结束后整体写成 JSON，代替解析文本日志。

mod types;

pub use types::{TraceEvent, TraceEventKind, TraceLogger};
