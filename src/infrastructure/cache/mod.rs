mod redis_cache;

pub use redis_cache::RedisCache;

use crate::errors::error::AppError;
use async_trait::async_trait;
use std::time::Duration;

/// 查询结果缓存（字符串键值，带过期时间）
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError>;
}

pub fn eth_balance_key(address: &str) -> String {
    format!("eth:balance:{}", address)
}

pub fn erc20_balance_key(contract: &str, address: &str) -> String {
    format!("erc20:balance:{}:{}", contract, address)
}

pub fn block_key(block: &str) -> String {
    format!("block:{}", block)
}

pub fn tx_key(tx_hash: &str) -> String {
    format!("tx:{}", tx_hash)
}
