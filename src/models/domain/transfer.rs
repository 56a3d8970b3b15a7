use chrono::NaiveDateTime;
use ethers_core::types::H256;
use ethers_core::utils::keccak256;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// keccak256("Transfer(address,address,uint256)")
    /// = 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
    pub static ref ERC20_TRANSFER_TOPIC: H256 =
        H256::from(keccak256("Transfer(address,address,uint256)"));
}

/// ERC20 Transfer 事件解析出的转账记录，一笔交易可对应多条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub contract_address: String,
    /// 原始整数单位，不做精度换算
    pub amount: String,
    pub created_at: NaiveDateTime,
}
