use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::hal::{Hardware, RadioTransport};
use crate::protocol::{LinkEvent, NodeId, SendStatus, MAX_DATAGRAM_LEN};

/// 模拟器错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorError {
    AlreadyInitialized,
    NotInitialized,
    PeerNotRegistered,
    EmptyPayload,
    PayloadTooLarge,
    ChannelClosed,
}

/// 共享"空气"信道，把多个模拟节点的事件队列连在一起。
/// 每个节点初始化时把自己的事件入口挂到登记表上
#[derive(Clone)]
pub struct SimChannel {
    nodes: Arc<Mutex<Vec<(NodeId, Sender<LinkEvent>)>>>,
}

impl SimChannel {
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 登记一个节点的事件入口
    fn attach(&self, node_id: NodeId, events: Sender<LinkEvent>) {
        if let Ok(mut nodes) = self.nodes.lock() {
            nodes.push((node_id, events));
        }
    }

    /// 把数据报投递给除发送方以外所有匹配目标地址的节点
    fn deliver(&self, source: NodeId, dest: NodeId, data: &[u8]) -> Result<(), SimulatorError> {
        let payload: heapless::Vec<u8, MAX_DATAGRAM_LEN> =
            heapless::Vec::from_slice(data).map_err(|_| SimulatorError::PayloadTooLarge)?;

        if let Ok(nodes) = self.nodes.lock() {
            for (id, events) in nodes.iter() {
                // 发送方自己收不到自己的数据报
                if *id == source {
                    continue;
                }
                if dest.is_broadcast() || dest == *id {
                    let _ = events.send(LinkEvent::Received {
                        peer: source,
                        data: payload.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// 模拟无线数据报接口
pub struct SimRadio {
    node_id: NodeId,
    air: SimChannel,
    own_events: Option<Sender<LinkEvent>>,
    inbox: Option<Receiver<LinkEvent>>,
    peers: Vec<NodeId>,
}

impl SimRadio {
    pub fn new(air: SimChannel, node_id: NodeId) -> Self {
        Self {
            node_id,
            air,
            own_events: None,
            inbox: None,
            peers: Vec::new(),
        }
    }
}

impl RadioTransport for SimRadio {
    type Error = SimulatorError;

    fn initialize(&mut self) -> Result<(), SimulatorError> {
        if self.own_events.is_some() {
            return Err(SimulatorError::AlreadyInitialized);
        }

        let (tx, rx) = unbounded();
        self.air.attach(self.node_id, tx.clone());
        self.own_events = Some(tx);
        self.inbox = Some(rx);
        Ok(())
    }

    fn local_address(&self) -> NodeId {
        self.node_id
    }

    fn add_broadcast_peer(&mut self, peer: NodeId) -> Result<(), SimulatorError> {
        if self.own_events.is_none() {
            return Err(SimulatorError::NotInitialized);
        }
        if !self.peers.contains(&peer) {
            self.peers.push(peer);
        }
        Ok(())
    }

    fn send_datagram(&mut self, dest: NodeId, data: &[u8]) -> Result<(), SimulatorError> {
        if self.own_events.is_none() {
            return Err(SimulatorError::NotInitialized);
        }
        if data.is_empty() {
            return Err(SimulatorError::EmptyPayload);
        }
        if data.len() > MAX_DATAGRAM_LEN {
            return Err(SimulatorError::PayloadTooLarge);
        }
        if !self.peers.contains(&dest) {
            return Err(SimulatorError::PeerNotRegistered);
        }

        self.air.deliver(self.node_id, dest, data)?;

        // 链路层确认：数据报离开本节点后事件立即入队
        let events = self.own_events.as_ref().ok_or(SimulatorError::NotInitialized)?;
        events
            .send(LinkEvent::SendComplete {
                peer: dest,
                status: SendStatus::Success,
            })
            .map_err(|_| SimulatorError::ChannelClosed)?;
        Ok(())
    }

    fn poll_event(&mut self) -> Option<LinkEvent> {
        self.inbox.as_ref()?.try_recv().ok()
    }

    fn wait_event(&mut self, timeout_ms: u32) -> Option<LinkEvent> {
        let inbox = self.inbox.as_ref()?;
        inbox
            .recv_timeout(Duration::from_millis(u64::from(timeout_ms)))
            .ok()
    }
}

/// 模拟器硬件实现
pub struct SimHardware {
    node_id: NodeId,
    radio: SimRadio,
    start_time: Instant,
}

impl SimHardware {
    pub fn new(node_id: NodeId, air: SimChannel) -> Self {
        Self {
            node_id,
            radio: SimRadio::new(air, node_id),
            start_time: Instant::now(),
        }
    }
}

impl Hardware for SimHardware {
    type Error = SimulatorError;
    type Radio = SimRadio;

    fn get_node_id(&self) -> NodeId {
        self.node_id
    }

    fn get_radio(&mut self) -> &mut SimRadio {
        &mut self.radio
    }

    fn get_timestamp_us(&self) -> Result<u64, SimulatorError> {
        Ok(self.start_time.elapsed().as_micros() as u64)
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), SimulatorError> {
        thread::sleep(Duration::from_millis(u64::from(ms)));
        Ok(())
    }
}

impl embedded_hal::blocking::delay::DelayMs<u32> for SimHardware {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
