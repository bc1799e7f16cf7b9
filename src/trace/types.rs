//! 追踪事件类型定义

use serde::{Deserialize, Serialize};

/// 追踪事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// 主机把报文交给覆盖网络
    FrameSent { from: String, to: String },
    /// 帧到达目标主机（进入入口适配器之前）
    FrameDelivered { from: String },
    /// 入口适配器丢弃了帧
    IngressDrop { reason: String },
    /// TCP 引擎处理完成
    TcpInput { outcome: String },
    /// 目标首跳上没有主机
    Unroutable { to: String },
}

/// 一条追踪事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    pub host: Option<usize>,
    /// 报文字节数（不含首跳前缀）
    pub bytes: usize,
    #[serde(flatten)]
    pub kind: TraceEventKind,
}

/// 内存中的事件收集器，运行结束后整体写出
#[derive(Debug, Default)]
pub struct TraceLogger {
    pub events: Vec<TraceEvent>,
}

impl TraceLogger {
    /// 追加一条事件
    pub fn push(&mut self, ev: TraceEvent) {
        self.events.push(ev);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 序列化为格式化的 JSON 数组
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }
}
