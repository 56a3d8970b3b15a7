//! 日志数据的定长解码：每种目标类型一个函数，由调用方选择
use crate::errors::error::AppError;
use ethers_core::types::{Address, H256, U256};

pub const WORD_SIZE: usize = 32;

fn word(data: &[u8], start: usize) -> Result<&[u8], AppError> {
    let end = start
        .checked_add(WORD_SIZE)
        .ok_or(AppError::InvalidRange {
            start,
            end: usize::MAX,
            len: data.len(),
        })?;
    data.get(start..end).ok_or(AppError::InvalidRange {
        start,
        end,
        len: data.len(),
    })
}

/// 从 data[start..start+32] 读取大端 uint256
pub fn decode_u256_word(data: &[u8], start: usize) -> Result<U256, AppError> {
    word(data, start).map(U256::from_big_endian)
}

/// indexed 地址参数：topic 的后 20 字节
pub fn decode_topic_address(topic: &H256) -> Address {
    Address::from_slice(&topic.as_bytes()[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_word() {
        let mut data = vec![0u8; 64];
        data[31] = 0x2a;
        data[63] = 0x01;
        assert_eq!(decode_u256_word(&data, 0).unwrap(), U256::from(42));
        assert_eq!(decode_u256_word(&data, 32).unwrap(), U256::one());
    }

    #[test]
    fn short_data_is_a_range_error() {
        let data = vec![0u8; 31];
        assert!(matches!(
            decode_u256_word(&data, 0),
            Err(AppError::InvalidRange { start: 0, end: 32, len: 31 })
        ));
        assert!(decode_u256_word(&data, usize::MAX).is_err());
    }

    #[test]
    fn topic_address_uses_low_twenty_bytes() {
        let addr = Address::from_low_u64_be(0xdead_beef);
        let topic = H256::from(addr);
        assert_eq!(decode_topic_address(&topic), addr);
        assert_eq!(decode_u256_word(topic.as_bytes(), 0).unwrap(), U256::from(0xdead_beefu64));
    }
}
