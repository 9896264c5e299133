/// 用确定性模式填充测试载荷：第i字节 = i mod 256
pub fn fill_test_pattern(buffer: &mut [u8]) {
    for (i, byte) in buffer.iter_mut().enumerate() {
        *byte = i as u8;
    }
}

/// 校验一段数据是否仍是确定性测试模式的前缀，
/// 回显端和发送端都用它确认载荷在链路上没有被破坏
pub fn verify_test_pattern(data: &[u8]) -> bool {
    data.iter().enumerate().all(|(i, byte)| *byte == i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_pattern() {
        let mut buffer = [0u8; 300];
        fill_test_pattern(&mut buffer);

        assert_eq!(buffer[0], 0);
        assert_eq!(buffer[255], 255);
        // 超过256后回绕
        assert_eq!(buffer[256], 0);
        assert_eq!(buffer[299], 43);
    }

    #[test]
    fn test_verify_pattern() {
        let mut buffer = [0u8; 64];
        fill_test_pattern(&mut buffer);
        assert!(verify_test_pattern(&buffer));
        assert!(verify_test_pattern(&buffer[..1]));
        assert!(verify_test_pattern(&[]));

        buffer[10] = 0xAA;
        assert!(!verify_test_pattern(&buffer));
    }
}
