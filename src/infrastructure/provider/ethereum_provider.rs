use crate::config::EthereumConfig;
use crate::errors::error::AppError;
use crate::log_info;
use async_trait::async_trait;
use ethers::prelude::{H256, U64, U256};
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, Block, BlockNumber, Bytes, Transaction, TransactionReceipt};
use ethers_providers::{Http, Provider};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// 只读链上访问接口，扫块与查询服务都只依赖这个 trait
#[async_trait]
pub trait ProviderTrait: Send + Sync {
    async fn get_last_block_number(&self) -> Result<U64, AppError>;
    async fn get_block_with_txs(
        &self,
        number: BlockNumber,
    ) -> Result<Option<Block<Transaction>>, AppError>;
    async fn get_transaction(&self, tx_hash: H256) -> Result<Option<Transaction>, AppError>;
    async fn get_transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, AppError>;
    async fn get_balance(&self, address: Address) -> Result<U256, AppError>;
    async fn call(&self, tx: &TypedTransaction) -> Result<Bytes, AppError>;
}

/// 多个 API key 轮询的 HTTP Provider 池
pub struct EthereumProvider {
    providers: Vec<Arc<Provider<Http>>>,
    index: AtomicUsize,
}

fn endpoint_urls(config: &EthereumConfig) -> Result<Vec<Url>, AppError> {
    let base = Url::parse(&config.rpc_url)
        .map_err(|e| AppError::InvalidUrl(format!("{}: {}", config.rpc_url, e)))?;
    let keys: Vec<&str> = config
        .api_keys
        .split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();

    if keys.is_empty() {
        return Ok(vec![base]);
    }
    keys.into_iter()
        .map(|key| {
            if config.rpc_url.ends_with('/') {
                base.join(key)
                    .map_err(|e| AppError::InvalidUrl(format!("{}{}: {}", config.rpc_url, key, e)))
            } else {
                let mut url = base.clone();
                url.set_path(&format!("/{}", key));
                Ok(url)
            }
        })
        .collect()
}

impl EthereumProvider {
    pub fn new(config: &EthereumConfig) -> Result<Self, AppError> {
        let providers = endpoint_urls(config)?
            .into_iter()
            .map(|url| {
                Provider::<Http>::try_from(url.as_str())
                    .map(Arc::new)
                    .map_err(|e| AppError::InvalidUrl(format!("{}: {}", url, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log_info!("成功初始化 {} 个RPC Provider", providers.len());
        Ok(Self {
            providers,
            index: AtomicUsize::new(0),
        })
    }

    pub fn get_provider(&self) -> Arc<Provider<Http>> {
        let i = self.index.fetch_add(1, Ordering::Relaxed);
        self.providers[i % self.providers.len()].clone()
    }
}
