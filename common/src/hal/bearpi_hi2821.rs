use heapless::Vec;

use crate::hal::{Hardware, RadioTransport};
use crate::protocol::{LinkEvent, NodeId, SendStatus, MAX_DATAGRAM_LEN};
use crate::utils::AlignedBuffer;

// NearLink SDK上报的事件类型编号
const NL_EVENT_NONE: u8 = 0;
const NL_EVENT_TX_DONE: u8 = 1;
const NL_EVENT_TX_FAILED: u8 = 2;
const NL_EVENT_RX: u8 = 3;

#[repr(C)]
pub struct NearlinkConfig {
    channel: u8,
    tx_power: i8,
    pan_id: u16,
}

extern "C" {
    fn nl_init(config: *const NearlinkConfig) -> i32;
    fn nl_local_addr(out: *mut u8);
    fn nl_add_peer(addr: *const u8) -> i32;
    fn nl_send(dest: *const u8, data: *const u8, len: usize) -> i32;
    fn nl_poll_event(
        kind: *mut u8,
        peer: *mut u8,
        buf: *mut u8,
        max_len: usize,
        actual_len: *mut usize,
    ) -> i32;
    fn nl_timestamp_us() -> u64;
    fn nl_delay_ms(ms: u32);
}

/// 硬件后端错误类型，保留SDK原始返回码便于排查
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearPiError {
    AlreadyInitialized,
    NotInitialized,
    InitFailed(i32),
    PeerRejected(i32),
    EmptyPayload,
    PayloadTooLarge,
    SendRejected(i32),
}

pub struct BearPiRadio {
    config: NearlinkConfig,
    initialized: bool,
    rx_staging: AlignedBuffer<256>,
}

impl BearPiRadio {
    pub fn new() -> Self {
        Self {
            config: NearlinkConfig {
                channel: 15,
                tx_power: 20,
                pan_id: 0x1234,
            },
            initialized: false,
            rx_staging: AlignedBuffer::new(),
        }
    }
}

impl RadioTransport for BearPiRadio {
    type Error = BearPiError;

    fn initialize(&mut self) -> Result<(), BearPiError> {
        if self.initialized {
            return Err(BearPiError::AlreadyInitialized);
        }

        let ret = unsafe { nl_init(&self.config as *const NearlinkConfig) };
        if ret != 0 {
            defmt::error!("NearLink初始化失败: {}", ret);
            return Err(BearPiError::InitFailed(ret));
        }
        self.initialized = true;
        Ok(())
    }

    fn local_address(&self) -> NodeId {
        let mut addr = [0u8; 6];
        unsafe {
            nl_local_addr(addr.as_mut_ptr());
        }
        NodeId(addr)
    }

    fn add_broadcast_peer(&mut self, peer: NodeId) -> Result<(), BearPiError> {
        if !self.initialized {
            return Err(BearPiError::NotInitialized);
        }
        let ret = unsafe { nl_add_peer(peer.0.as_ptr()) };
        if ret == 0 {
            Ok(())
        } else {
            Err(BearPiError::PeerRejected(ret))
        }
    }

    fn send_datagram(&mut self, dest: NodeId, data: &[u8]) -> Result<(), BearPiError> {
        if !self.initialized {
            return Err(BearPiError::NotInitialized);
        }
        if data.is_empty() {
            return Err(BearPiError::EmptyPayload);
        }
        if data.len() > MAX_DATAGRAM_LEN {
            return Err(BearPiError::PayloadTooLarge);
        }

        let ret = unsafe { nl_send(dest.0.as_ptr(), data.as_ptr(), data.len()) };
        if ret == 0 {
            Ok(())
        } else {
            Err(BearPiError::SendRejected(ret))
        }
    }

    fn poll_event(&mut self) -> Option<LinkEvent> {
        if !self.initialized {
            return None;
        }

        let mut kind = NL_EVENT_NONE;
        let mut peer = [0u8; 6];
        let mut actual_len: usize = 0;

        let ret = {
            let buf = self.rx_staging.as_mut_slice();
            unsafe {
                nl_poll_event(
                    &mut kind,
                    peer.as_mut_ptr(),
                    buf.as_mut_ptr(),
                    buf.len(),
                    &mut actual_len,
                )
            }
        };
        if ret != 0 || kind == NL_EVENT_NONE {
            return None;
        }

        match kind {
            NL_EVENT_TX_DONE => Some(LinkEvent::SendComplete {
                peer: NodeId(peer),
                status: SendStatus::Success,
            }),
            NL_EVENT_TX_FAILED => Some(LinkEvent::SendComplete {
                peer: NodeId(peer),
                status: SendStatus::Failure,
            }),
            NL_EVENT_RX => {
                self.rx_staging
                    .set_len(core::cmp::min(actual_len, MAX_DATAGRAM_LEN));
                let data: Vec<u8, MAX_DATAGRAM_LEN> =
                    Vec::from_slice(self.rx_staging.as_slice()).ok()?;
                Some(LinkEvent::Received {
                    peer: NodeId(peer),
                    data,
                })
            }
            _ => {
                defmt::warn!("未知的NearLink事件类型: {}", kind);
                None
            }
        }
    }

    fn wait_event(&mut self, timeout_ms: u32) -> Option<LinkEvent> {
        // SDK没有阻塞等待接口，按1ms步长轮询
        let mut waited = 0;
        loop {
            if let Some(event) = self.poll_event() {
                return Some(event);
            }
            if waited >= timeout_ms {
                return None;
            }
            unsafe {
                nl_delay_ms(1);
            }
            waited += 1;
        }
    }
}

/// BearPi HI2821硬件实现
pub struct BearPiHardware {
    radio: BearPiRadio,
}

impl BearPiHardware {
    pub fn new() -> Self {
        Self {
            radio: BearPiRadio::new(),
        }
    }
}

impl Hardware for BearPiHardware {
    type Error = BearPiError;
    type Radio = BearPiRadio;

    fn get_node_id(&self) -> NodeId {
        self.radio.local_address()
    }

    fn get_radio(&mut self) -> &mut BearPiRadio {
        &mut self.radio
    }

    fn get_timestamp_us(&self) -> Result<u64, BearPiError> {
        Ok(unsafe { nl_timestamp_us() })
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), BearPiError> {
        unsafe {
            nl_delay_ms(ms);
        }
        Ok(())
    }
}

impl embedded_hal::blocking::delay::DelayMs<u32> for BearPiHardware {
    fn delay_ms(&mut self, ms: u32) {
        unsafe {
            nl_delay_ms(ms);
        }
    }
}
