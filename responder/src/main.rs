#![cfg_attr(not(feature = "simulator"), no_std)]
#![cfg_attr(not(feature = "simulator"), no_main)]

use common::hal::{Hardware, RadioTransport};
use common::protocol::{LinkEvent, NodeId};
use common::utils::{calculate_checksum, verify_test_pattern};

/// 回显的目标地址模式：true为播回广播地址，false为单播回发送方。
/// 编译期配置，运行期没有开关
const REPLY_TO_BROADCAST: bool = true;

/// 收包等待的轮询窗口（毫秒）
const IDLE_WAIT_MS: u32 = 1_000;

#[cfg(feature = "simulator")]
fn main() {
    use common::hal::simulator::{SimChannel, SimHardware};

    // 模拟器入口
    println!("启动AetherProbe回显端（模拟器模式）");

    let air = SimChannel::new();
    let node_id = NodeId::new([0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6]);
    let mut hardware = SimHardware::new(node_id, air);

    responder_main(&mut hardware);
}

#[cfg(all(feature = "bearpi", not(feature = "simulator")))]
#[cortex_m_rt::entry]
fn main() -> ! {
    use common::hal::bearpi_hi2821::BearPiHardware;

    // BearPi硬件入口
    let mut hardware = BearPiHardware::new();

    if let Err(e) = hardware.get_radio().initialize() {
        defmt::error!("链路初始化失败: {}", defmt::Debug2Format(&e));
        loop {}
    }

    let addr = hardware.get_node_id().octets();
    defmt::info!("本机硬件地址: {=[u8; 6]:#X}", addr);

    if let Err(e) = hardware.get_radio().add_broadcast_peer(NodeId::BROADCAST) {
        defmt::error!("注册广播对端失败: {}", defmt::Debug2Format(&e));
        loop {}
    }

    let mut echoed: u64 = 0;
    loop {
        if let Some(LinkEvent::Received { peer, data }) = hardware.get_radio().wait_event(IDLE_WAIT_MS)
        {
            let dest = if REPLY_TO_BROADCAST { NodeId::BROADCAST } else { peer };
            if !REPLY_TO_BROADCAST {
                let _ = hardware.get_radio().add_broadcast_peer(peer);
            }
            if hardware.get_radio().send_datagram(dest, &data).is_ok() {
                echoed += 1;
                defmt::info!("回显第 {} 包，{} 字节", echoed, data.len());
            }
        }
    }
}

#[cfg(all(feature = "bearpi", not(feature = "simulator")))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

#[cfg(feature = "simulator")]
fn responder_main<H: Hardware>(hardware: &mut H) {
    // 启动时打印发现的硬件地址
    let addr = hardware.get_node_id().octets();
    println!(
        "本机硬件地址: {:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        addr[0], addr[1], addr[2], addr[3], addr[4], addr[5]
    );

    // 传输层初始化失败是致命错误，直接终止启动
    let radio = hardware.get_radio();
    if let Err(e) = radio.initialize() {
        println!("链路初始化失败: {:?}，退出", e);
        return;
    }

    if let Err(e) = radio.add_broadcast_peer(NodeId::BROADCAST) {
        println!("注册广播对端失败: {:?}，退出", e);
        return;
    }

    println!("等待探测数据包...");

    let mut echoed: u64 = 0;

    // 主循环：收到什么就原样回显什么
    loop {
        match hardware.get_radio().wait_event(IDLE_WAIT_MS) {
            Some(LinkEvent::Received { peer, data }) => {
                let checksum = calculate_checksum(&data);
                let pattern_ok = verify_test_pattern(&data);

                let dest = if REPLY_TO_BROADCAST { NodeId::BROADCAST } else { peer };
                if !REPLY_TO_BROADCAST {
                    // 单播回复前先把发送方登记为对端
                    let _ = hardware.get_radio().add_broadcast_peer(peer);
                }

                if let Err(e) = hardware.get_radio().send_datagram(dest, &data) {
                    println!("回显发送失败: {:?}", e);
                    continue;
                }

                echoed += 1;
                println!(
                    "回显第 {} 包: 来自 {:?}，{} 字节，CRC=0x{:04X}，模式校验{}",
                    echoed,
                    peer,
                    data.len(),
                    checksum,
                    if pattern_ok { "通过" } else { "失败" }
                );
            }
            Some(LinkEvent::SendComplete { .. }) => {
                // 自己回显包的发送完成事件，忽略
            }
            None => {}
        }
    }
}
