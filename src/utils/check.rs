use crate::errors::error::AppError;
use ethers_core::types::{Address, BlockNumber, H256, U64};

/// "latest" 或十进制区块号
pub const LATEST_BLOCK: &str = "latest";

/// 校验并解析以太坊地址（0x + 40 位 hex）
pub fn parse_address(raw: &str) -> Result<Address, AppError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if digits.len() != 40 || hex::decode(digits).is_err() {
        return Err(AppError::InvalidAddress(raw.to_string()));
    }
    trimmed
        .parse::<Address>()
        .map_err(|_| AppError::InvalidAddress(raw.to_string()))
}

/// 交易哈希允许省略 0x 前缀
pub fn parse_tx_hash(raw: &str) -> Result<H256, AppError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|_| AppError::InvalidTxHash(raw.to_string()))?;
    if bytes.len() != 32 {
        return Err(AppError::InvalidTxHash(raw.to_string()));
    }
    Ok(H256::from_slice(&bytes))
}

pub fn parse_block_number(raw: &str) -> Result<BlockNumber, AppError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(LATEST_BLOCK) {
        return Ok(BlockNumber::Latest);
    }
    trimmed
        .parse::<u64>()
        .map(|n| BlockNumber::Number(U64::from(n)))
        .map_err(|_| AppError::InvalidBlockNumber(raw.to_string()))
}
