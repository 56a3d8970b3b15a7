use super::ethereum_provider::{EthereumProvider, ProviderTrait};
use crate::errors::error::AppError;
use crate::log_warn;
use async_trait::async_trait;
use ethers::prelude::{U64, U256};
use ethers::providers::ProviderError;
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{
    Address, Block, BlockNumber, Bytes, H256, Transaction, TransactionReceipt,
};
use ethers_providers::{Http, Middleware, Provider};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

pub struct RetryAdapter {
    provider: Arc<EthereumProvider>,
    max_retries: usize,
    base_delay: Duration,
}

/// 第 attempt 次重试前的等待：base * 2^(attempt-1)，指数上限 2^10，外加 0~10% 抖动
fn backoff_delay(base: Duration, attempt: usize) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10) as u32;
    let delay_ms = (base.as_millis() as u64).saturating_mul(1u64 << exponent);
    // 防止多个重试任务在同一时间点“齐射” RPC 节点
    let jitter = rand::thread_rng().gen_range(0..=(delay_ms / 10 + 1));
    Duration::from_millis(delay_ms + jitter)
}

impl RetryAdapter {
    pub fn new(provider: Arc<EthereumProvider>, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            provider,
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    async fn retry_call<T, Fut, F>(&self, mut f: F) -> Result<T, AppError>
    where
        F: FnMut(Arc<Provider<Http>>) -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, ProviderError>> + Send,
    {
        let mut last_error: Option<ProviderError> = None;
        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay, attempt);
                log_warn!("RPC 第 {} 次重试，等待 {:?}...", attempt + 1, delay);
                sleep(delay).await;
            }
            match f(self.provider.get_provider()).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    log_warn!("RPC 调用失败 (第 {} 次): {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }
        Err(AppError::ProviderError(format!(
            "重试 {} 次失败，最后错误: {:?}",
            self.max_retries, last_error
        )))
    }
}

#[async_trait]
impl ProviderTrait for RetryAdapter {
    async fn get_last_block_number(&self) -> Result<U64, AppError> {
        self.retry_call(|p| async move { p.get_block_number().await })
            .await
    }

    async fn get_block_with_txs(
        &self,
        number: BlockNumber,
    ) -> Result<Option<Block<Transaction>>, AppError> {
        self.retry_call(move |p| async move { p.get_block_with_txs(number).await })
            .await
    }

    async fn get_transaction(&self, tx_hash: H256) -> Result<Option<Transaction>, AppError> {
        self.retry_call(move |p| async move { p.get_transaction(tx_hash).await })
            .await
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, AppError> {
        self.retry_call(move |p| async move { p.get_transaction_receipt(tx_hash).await })
            .await
    }

    async fn get_balance(&self, address: Address) -> Result<U256, AppError> {
        self.retry_call(move |p| async move { p.get_balance(address, None).await })
            .await
    }

    async fn call(&self, tx: &TypedTransaction) -> Result<Bytes, AppError> {
        self.retry_call(move |p| {
            let tx = tx.clone();
            async move { p.call(&tx, None).await }
        })
        .await
    }
}
