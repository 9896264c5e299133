#[cfg(feature = "bearpi")]
pub mod bearpi_hi2821;
#[cfg(feature = "simulator")]
pub mod simulator;

use crate::protocol::{LinkEvent, NodeId};

/// 无线数据报传输抽象。
/// 底层是无连接、无确认的广播数据报链路，按6字节硬件地址寻址
pub trait RadioTransport {
    type Error: core::fmt::Debug;

    /// 初始化链路并接入事件队列（等价于向底层注册发送完成
    /// 和接收两个回调）。重复初始化返回明确错误，不允许崩溃
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// 本节点的硬件地址
    fn local_address(&self) -> NodeId;

    /// 登记对端地址，向该地址首次发送之前必须调用
    fn add_broadcast_peer(&mut self, peer: NodeId) -> Result<(), Self::Error>;

    /// 发送数据报，即发即忘，不等待完成；
    /// 完成情况通过SendComplete事件异步上报
    fn send_datagram(&mut self, dest: NodeId, data: &[u8]) -> Result<(), Self::Error>;

    /// 非阻塞取一个链路事件
    fn poll_event(&mut self) -> Option<LinkEvent>;

    /// 在超时窗口内等待一个链路事件，超时返回None
    fn wait_event(&mut self, timeout_ms: u32) -> Option<LinkEvent>;
}

/// 硬件抽象层接口
pub trait Hardware {
    type Error: core::fmt::Debug;
    type Radio: RadioTransport;

    /// 获取本节点ID
    fn get_node_id(&self) -> NodeId;

    /// 获取无线数据报接口
    fn get_radio(&mut self) -> &mut Self::Radio;

    /// 获取单调微秒时间戳
    fn get_timestamp_us(&self) -> Result<u64, Self::Error>;

    /// 延时指定毫秒数
    fn delay_ms(&mut self, ms: u32) -> Result<(), Self::Error>;
}
