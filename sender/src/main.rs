#![cfg_attr(not(feature = "simulator"), no_std)]
#![cfg_attr(not(feature = "simulator"), no_main)]

use common::hal::{Hardware, RadioTransport};
use common::probe::{
    run_sequence, LatencyProbe, ProbeStats, SequenceNotice, INTER_SEND_DELAY_MS, PROBE_SEQUENCE,
};
use common::protocol::NodeId;

#[cfg(feature = "simulator")]
fn main() {
    use common::hal::simulator::{SimChannel, SimHardware};
    use common::protocol::LINK_PROTOCOL_VERSION;
    use std::thread;

    // 模拟器入口
    println!("启动AetherProbe发送端（模拟器模式）");
    println!("链路协议版本: {}", LINK_PROTOCOL_VERSION);

    let air = SimChannel::new();

    // 模拟器里没有第二块板子，起一个进程内的回显对端陪跑，
    // 单进程也能观察到完整往返
    let peer = SimHardware::new(NodeId::new([0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6]), air.clone());
    thread::spawn(move || echo_peer(peer));

    let node_id = NodeId::new([0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6]);
    let mut hardware = SimHardware::new(node_id, air);

    // 等回显对端完成初始化再开始发，否则第一包没有人回
    let _ = hardware.delay_ms(20);

    sender_main(&mut hardware);
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

    let mut probe = LatencyProbe::new();
    let mut stats = ProbeStats::new();
    run_sequence(&mut hardware, &mut probe, &mut stats, |notice| {
        if let SequenceNotice::RoundTrip { report, .. } = notice {
            defmt::info!(
                "发送确认延迟: {} us，往返延迟: {} us，回包 {} 字节",
                report.send_latency_us,
                report.round_trip_us,
                report.payload_len
            );
        }
    });

    defmt::info!(
        "序列完成: 发送 {} 次，确认 {} 次，回包 {} 次",
        stats.sent(),
        stats.confirmed(),
        stats.replies()
    );

    // 与上板测试固件一致，序列结束后停在空转循环里
    loop {}
}

#[cfg(all(feature = "bearpi", not(feature = "simulator")))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// 进程内回显对端：收到什么就原样播回去
#[cfg(feature = "simulator")]
fn echo_peer(mut hardware: common::hal::simulator::SimHardware) {
    use common::protocol::LinkEvent;

    let radio = hardware.get_radio();
    if radio.initialize().is_err() {
        return;
    }
    let _ = radio.add_broadcast_peer(NodeId::BROADCAST);

    loop {
        match hardware.get_radio().wait_event(1_000) {
            Some(LinkEvent::Received { data, .. }) => {
                let _ = hardware.get_radio().send_datagram(NodeId::BROADCAST, &data);
            }
            // 自己回显包的发送完成事件，忽略
            Some(_) | None => {}
        }
    }
}

#[cfg(feature = "simulator")]
fn sender_main<H: Hardware>(hardware: &mut H) {
    // 启动时打印发现的硬件地址，每个地址一行
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

    println!(
        "开始探测序列: {:?}，发送间隔 {}ms",
        PROBE_SEQUENCE, INTER_SEND_DELAY_MS
    );

    let mut probe = LatencyProbe::new();
    let mut stats = ProbeStats::new();

    run_sequence(hardware, &mut probe, &mut stats, |notice| match notice {
        SequenceNotice::SubmitRejected { len } => {
            println!("载荷长度 {} 不合法，跳过本次探测", len);
        }
        SequenceNotice::SubmitFailed { len } => {
            println!("传输层拒绝发送 {} 字节探测包，继续", len);
        }
        SequenceNotice::RoundTrip {
            report,
            pattern_ok,
            checksum,
        } => {
            println!(
                "发送确认延迟: {} us，往返延迟: {} us，回包 {} 字节，CRC=0x{:04X}，模式校验{}",
                report.send_latency_us,
                report.round_trip_us,
                report.payload_len,
                checksum,
                if pattern_ok { "通过" } else { "失败" }
            );
        }
    });

    println!(
        "序列完成: 发送 {} 次，确认 {} 次，提交失败 {} 次，回包 {} 次",
        stats.sent(),
        stats.confirmed(),
        stats.submit_failures(),
        stats.replies()
    );
    if stats.replies() > 0 {
        println!(
            "往返延迟统计: 最小 {} us，平均 {} us，最大 {} us",
            stats.min_rtt_us(),
            stats.avg_rtt_us(),
            stats.max_rtt_us()
        );
    }
}
