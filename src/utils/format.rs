use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::{BigInt, Sign};
use chrono::{DateTime, Local};
use ethers_core::types::U256;
use ethers_core::utils::format_units;

/// 原生资产（ETH）的小数位数
pub const ETHER_DECIMALS: i64 = 18;

pub fn u256_to_bigint(value: U256) -> BigInt {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    BigInt::from_bytes_be(Sign::Plus, &buf)
}

/// Wei -> ETH，全程任意精度，输出非科学计数法并去掉末尾多余的 0
pub fn wei_to_ether(value: Option<U256>) -> String {
    match value {
        Some(wei) if !wei.is_zero() => BigDecimal::new(u256_to_bigint(wei), ETHER_DECIMALS)
            .normalized()
            .to_plain_string(),
        _ => "0".to_string(),
    }
}

/// Wei -> Gwei，仅用于展示 gas price
pub fn wei_to_gwei(value: U256) -> String {
    match format_units(value, "gwei") {
        Ok(s) => trim_fraction(&s),
        Err(_) => "0".to_string(),
    }
}

fn trim_fraction(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 区块时间戳（秒）格式化为本地时间 "YYYY-MM-DD HH:MM:SS"
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
