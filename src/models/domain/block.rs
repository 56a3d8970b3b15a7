use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 扫块入库的区块记录（按高度唯一，只插入不更新）
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRecord {
    pub block_number: i64,
    pub block_hash: String,
    pub timestamp: NaiveDateTime,
    pub transactions_count: i32,
    pub gas_used: i64,
    pub gas_limit: i64,
    pub miner: String,
    pub created_at: NaiveDateTime,
}

/// 区块查询结果，整体序列化后写入缓存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub block_number: u64,
    pub hash: String,
    pub timestamp: String,
    #[serde(rename = "transactions_count")]
    pub transactions: usize,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub miner: String,
}
