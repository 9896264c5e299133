#![cfg_attr(not(feature = "simulator"), no_std)]

//! AetherProbe 顶层门面，重新导出探测工具的公共接口。
//! 节点角色入口见 sender / responder 两个成员crate

pub use common::hal::{Hardware, RadioTransport};
pub use common::probe::{
    run_sequence, LatencyProbe, ProbeError, ProbeReport, ProbeSample, ProbeStats, SendState,
    SequenceNotice, INTER_SEND_DELAY_MS, PROBE_SEQUENCE,
};
pub use common::protocol::{
    LinkEvent, NodeId, SendStatus, LINK_PROTOCOL_VERSION, MAX_DATAGRAM_LEN,
};
