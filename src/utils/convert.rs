use crate::errors::error::AppError;
use ethers_core::types::{Address, H256, U64, U256};

pub fn option_u64_to_i64(opt_u64: Option<U64>) -> Result<i64, AppError> {
    let u64_val = opt_u64
        .ok_or(AppError::Conversion("Block number is None".to_string()))?
        .as_u64();
    u64_to_i64(u64_val)
}

pub fn u64_to_i64(value: u64) -> Result<i64, AppError> {
    i64::try_from(value)
        .map_err(|e| AppError::Conversion(format!("u64({}) 转 i64 溢出: {}", value, e)))
}

pub fn h256_to_string(data: H256) -> String {
    format!("{:#x}", data) // 0x + 64 位 hex
}

pub fn address_to_string(address: Address) -> String {
    format!("{:#x}", address)
}

pub fn u256_to_i64(u256_val: U256) -> Result<i64, AppError> {
    if u256_val > U256::from(i64::MAX as u64) {
        return Err(AppError::Conversion(format!(
            "U256({}) 超出i64范围（最大值: {}）",
            u256_val,
            i64::MAX
        )));
    }
    Ok(u256_val.as_u64() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u256_beyond_i64_is_rejected() {
        assert_eq!(u256_to_i64(U256::from(21_000)).unwrap(), 21_000);
        assert!(u256_to_i64(U256::from(u64::MAX)).is_err());
        assert!(option_u64_to_i64(None).is_err());
    }

    #[test]
    fn hex_strings_are_lowercase_prefixed() {
        let addr = Address::from_low_u64_be(0xAB);
        assert_eq!(
            address_to_string(addr),
            "0x00000000000000000000000000000000000000ab"
        );
        assert_eq!(h256_to_string(H256::zero()).len(), 66);
    }
}
