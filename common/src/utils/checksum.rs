use crc::{Crc, CRC_16_IBM_3740};

// CRC-16/IBM-3740（即CCITT-FALSE）：多项式0x1021，初始值0xFFFF
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// 计算数据的CRC-16摘要，探测两端在日志里比对用
pub fn calculate_checksum(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// 校验数据摘要
pub fn verify_checksum(data: &[u8], checksum: u16) -> bool {
    calculate_checksum(data) == checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum() {
        // CRC-16/IBM-3740的标准校验值
        assert_eq!(calculate_checksum(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_verify_checksum() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let checksum = calculate_checksum(&data);

        assert!(verify_checksum(&data, checksum));
        assert!(!verify_checksum(&data, checksum ^ 0x0001));
    }
}
