use crate::errors::error::AppError;
use crate::infrastructure::cache::{
    CacheStore, block_key, erc20_balance_key, eth_balance_key, tx_key,
};
use crate::infrastructure::parser::recover_sender;
use crate::infrastructure::provider::ProviderTrait;
use crate::models::{BlockInfo, QueryRecord, QueryType, TransactionDetail, TxStatus};
use crate::repositories::ChainRepository;
use crate::utils::decode::decode_u256_word;
use crate::utils::{
    LATEST_BLOCK, address_to_string, format_timestamp, h256_to_string, parse_address,
    parse_block_number, parse_tx_hash, wei_to_ether, wei_to_gwei,
};
use crate::{log_debug, log_warn};
use ethers::abi::{Token, encode};
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, BlockNumber, Bytes, TransactionRequest};
use ethers_core::utils::keccak256;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// balanceOf(address) 的函数选择器
fn balance_of_call(contract: Address, owner: Address) -> TypedTransaction {
    let mut data = keccak256("balanceOf(address)")[..4].to_vec();
    data.extend(encode(&[Token::Address(owner)]));
    TransactionRequest::new()
        .to(contract)
        .data(Bytes::from(data))
        .into()
}

/// 缓存旁路查询：先查缓存，未命中再查链并回填；每次查询追加一条审计记录
pub struct QueryService {
    provider: Arc<dyn ProviderTrait>,
    cache: Arc<dyn CacheStore>,
    repository: Arc<dyn ChainRepository>,
    cache_ttl: Duration,
}

impl QueryService {
    pub fn new(
        provider: Arc<dyn ProviderTrait>,
        cache: Arc<dyn CacheStore>,
        repository: Arc<dyn ChainRepository>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            repository,
            cache_ttl,
        }
    }

    /// 缓存不可用时降级为未命中
    async fn cached(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(Some(value)) if !value.is_empty() => {
                log_debug!("缓存命中: {}", key);
                Some(value)
            }
            Ok(_) => None,
            Err(e) => {
                log_warn!("读取缓存 {} 失败，回源查询: {}", key, e);
                None
            }
        }
    }

    async fn cached_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cached(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log_warn!("缓存 {} 内容无法解析，回源查询: {}", key, e);
                None
            }
        }
    }

    async fn store(&self, key: &str, value: &str) {
        if let Err(e) = self.cache.set(key, value, self.cache_ttl).await {
            log_warn!("写入缓存 {} 失败: {}", key, e);
        }
    }

    async fn store_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.store(key, &raw).await,
            Err(e) => log_warn!("序列化缓存 {} 失败: {}", key, e),
        }
    }

    async fn record(&self, address: Option<String>, query_type: QueryType, param: &str) {
        let record = QueryRecord::new(address, query_type, param.to_string());
        if let Err(e) = self.repository.save_query_record(&record).await {
            log_warn!("保存查询记录失败 ({}): {}", query_type.as_str(), e);
        }
    }

    pub async fn get_eth_balance(&self, address: &str) -> Result<String, AppError> {
        let owner = parse_address(address)?;
        let owner_str = address_to_string(owner);
        let key = eth_balance_key(&owner_str);

        let balance = match self.cached(&key).await {
            Some(balance) => balance,
            None => {
                let wei = self.provider.get_balance(owner).await?;
                let balance = wei_to_ether(Some(wei));
                self.store(&key, &balance).await;
                balance
            }
        };

        self.record(Some(owner_str.clone()), QueryType::EthBalance, &owner_str)
            .await;
        Ok(balance)
    }

    /// 返回代币的原始整数单位，小数位由调用方按合约的 decimals 换算
    pub async fn get_token_balance(&self, address: &str, contract: &str) -> Result<String, AppError> {
        let owner = parse_address(address)?;
        let token = parse_address(contract)?;
        let owner_str = address_to_string(owner);
        let token_str = address_to_string(token);
        let key = erc20_balance_key(&token_str, &owner_str);

        let balance = match self.cached(&key).await {
            Some(balance) => balance,
            None => {
                let output = self.provider.call(&balance_of_call(token, owner)).await?;
                let raw = decode_u256_word(&output, 0).map_err(|_| {
                    AppError::NotFound(format!("{} 未返回 balanceOf 结果", token_str))
                })?;
                let balance = raw.to_string();
                self.store(&key, &balance).await;
                balance
            }
        };

        self.record(Some(owner_str), QueryType::Erc20Balance, &token_str)
            .await;
        Ok(balance)
    }

    pub async fn get_block_info(&self, block: &str) -> Result<BlockInfo, AppError> {
        let number = parse_block_number(block)?;
        let param = match number {
            BlockNumber::Number(n) => n.to_string(),
            _ => LATEST_BLOCK.to_string(),
        };
        let key = block_key(&param);

        let info = match self.cached_json::<BlockInfo>(&key).await {
            Some(info) => info,
            None => {
                let block = self
                    .provider
                    .get_block_with_txs(number)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("block {}", param)))?;
                let info = BlockInfo {
                    block_number: block.number.unwrap_or_default().as_u64(),
                    hash: block.hash.map(h256_to_string).unwrap_or_default(),
                    timestamp: format_timestamp(block.timestamp.low_u64()),
                    transactions: block.transactions.len(),
                    gas_used: block.gas_used.low_u64(),
                    gas_limit: block.gas_limit.low_u64(),
                    miner: block.author.map(address_to_string).unwrap_or_default(),
                };
                self.store_json(&key, &info).await;
                info
            }
        };

        self.record(None, QueryType::Block, &param).await;
        Ok(info)
    }

    pub async fn get_transaction_detail(&self, tx_hash: &str) -> Result<TransactionDetail, AppError> {
        let hash = parse_tx_hash(tx_hash)?;
        let hash_str = h256_to_string(hash);
        let key = tx_key(&hash_str);

        let detail = match self.cached_json::<TransactionDetail>(&key).await {
            Some(detail) => detail,
            None => {
                let tx = self
                    .provider
                    .get_transaction(hash)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("transaction {}", hash_str)))?;
                if tx.block_number.is_none() {
                    return Err(AppError::NotFound(format!("transaction {} is pending", hash_str)));
                }
                let receipt = self
                    .provider
                    .get_transaction_receipt(hash)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("receipt {}", hash_str)))?;

                let from = recover_sender(&tx)?;
                let gas_price = tx.gas_price.or(receipt.effective_gas_price).unwrap_or_default();
                let detail = TransactionDetail {
                    tx_hash: hash_str.clone(),
                    from: address_to_string(from),
                    to: tx.to.map(address_to_string),
                    value: wei_to_ether(Some(tx.value)),
                    gas_used: receipt.gas_used.map(|g| g.low_u64()),
                    gas_price: wei_to_gwei(gas_price),
                    block_number: receipt.block_number.or(tx.block_number).map(|n| n.as_u64()),
                    status: TxStatus::from_receipt_status(receipt.status),
                };
                self.store_json(&key, &detail).await;
                detail
            }
        };

        self.record(Some(detail.from.clone()), QueryType::Transaction, &hash_str)
            .await;
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        FakeCache, FakeProvider, FakeRepository, block_with_txs, signed_legacy_tx,
        success_receipt, test_wallet,
    };
    use ethers::signers::Signer;
    use ethers_core::types::{U64, U256};
    use std::sync::atomic::Ordering;

    const OWNER: &str = "0x00000000219ab540356cbb839cbe05303d7705fa";
    const TOKEN: &str = "0xdac17f958d2ee523a2206206994597c13d831ec7";

    struct Fixture {
        provider: Arc<FakeProvider>,
        cache: Arc<FakeCache>,
        repo: Arc<FakeRepository>,
        service: QueryService,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(FakeProvider::default());
        let cache = Arc::new(FakeCache::default());
        let repo = Arc::new(FakeRepository::default());
        let service = QueryService::new(
            provider.clone(),
            cache.clone(),
            repo.clone(),
            Duration::from_secs(300),
        );
        Fixture {
            provider,
            cache,
            repo,
            service,
        }
    }

    #[tokio::test]
    async fn balance_cache_hit_skips_the_chain() {
        let f = fixture();
        f.cache.put(&eth_balance_key(OWNER), "1.5");

        assert_eq!(f.service.get_eth_balance(OWNER).await.unwrap(), "1.5");
        assert_eq!(f.provider.calls.balances.load(Ordering::SeqCst), 0);
        // 命中缓存同样记录审计
        assert_eq!(f.repo.query_records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn balance_cache_miss_queries_once_and_fills_cache() {
        let f = fixture();
        let owner = parse_address(OWNER).unwrap();
        f.provider
            .balances
            .lock()
            .unwrap()
            .insert(owner, U256::exp10(18) * 3 / 2);

        assert_eq!(f.service.get_eth_balance(OWNER).await.unwrap(), "1.5");
        assert_eq!(f.provider.calls.balances.load(Ordering::SeqCst), 1);
        assert_eq!(f.cache.value(&eth_balance_key(OWNER)).as_deref(), Some("1.5"));
        assert_eq!(f.cache.ttl(&eth_balance_key(OWNER)), Some(Duration::from_secs(300)));

        // 第二次走缓存
        f.service.get_eth_balance(OWNER).await.unwrap();
        assert_eq!(f.provider.calls.balances.load(Ordering::SeqCst), 1);

        let records = f.repo.query_records.lock().unwrap().clone();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].query_type, QueryType::EthBalance);
        assert_eq!(records[0].address.as_deref(), Some(OWNER));
    }

    #[tokio::test]
    async fn cache_outage_degrades_to_chain_read() {
        let f = fixture();
        f.cache.unavailable.store(true, Ordering::SeqCst);

        assert_eq!(f.service.get_eth_balance(OWNER).await.unwrap(), "0");
        assert_eq!(f.provider.calls.balances.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_input_is_rejected_before_any_lookup() {
        let f = fixture();
        assert!(matches!(
            f.service.get_eth_balance("0x1234").await,
            Err(AppError::InvalidAddress(_))
        ));
        assert!(matches!(
            f.service.get_block_info("pending").await,
            Err(AppError::InvalidBlockNumber(_))
        ));
        assert_eq!(f.cache.gets.load(Ordering::SeqCst), 0);
        assert!(f.repo.query_records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn token_balance_uses_balance_of_and_returns_raw_units() {
        let f = fixture();
        let mut word = [0u8; 32];
        U256::from(123_456_789u64).to_big_endian(&mut word);
        *f.provider.call_result.lock().unwrap() = Bytes::from(word.to_vec());

        let balance = f.service.get_token_balance(OWNER, TOKEN).await.unwrap();
        assert_eq!(balance, "123456789");
        assert_eq!(
            f.cache.value(&erc20_balance_key(TOKEN, OWNER)).as_deref(),
            Some("123456789")
        );

        let records = f.repo.query_records.lock().unwrap().clone();
        assert_eq!(records[0].query_type, QueryType::Erc20Balance);
        assert_eq!(records[0].query_param, TOKEN);
    }

    #[test]
    fn balance_of_calldata_layout() {
        let owner = parse_address(OWNER).unwrap();
        let call = balance_of_call(parse_address(TOKEN).unwrap(), owner);
        let data = call.data().unwrap();
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 36);
        assert_eq!(&data[16..], owner.as_bytes());
    }

    #[tokio::test]
    async fn block_info_is_cached_as_json() {
        let f = fixture();
        f.provider.add_block(block_with_txs(42, vec![]), vec![]);

        let info = f.service.get_block_info("42").await.unwrap();
        assert_eq!(info.block_number, 42);
        assert_eq!(info.transactions, 0);
        assert_eq!(info.gas_limit, 30_000_000);

        let cached: BlockInfo =
            serde_json::from_str(&f.cache.value("block:42").unwrap()).unwrap();
        assert_eq!(cached, info);

        let again = f.service.get_block_info("42").await.unwrap();
        assert_eq!(again, info);
        assert_eq!(f.provider.calls.blocks.load(Ordering::SeqCst), 1);

        let latest = f.service.get_block_info("latest").await.unwrap();
        assert_eq!(latest.block_number, 42);
        assert!(f.cache.value("block:latest").is_some());
    }

    #[tokio::test]
    async fn missing_block_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.service.get_block_info("7").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn transaction_detail_recovers_sender_and_status() {
        let f = fixture();
        let wallet = test_wallet();
        let mut tx = signed_legacy_tx(&wallet, 1, true);
        tx.block_number = Some(U64::from(9));
        let mut receipt = success_receipt(&tx, vec![]);
        receipt.block_number = Some(U64::from(9));
        receipt.status = Some(U64::zero());
        f.provider.add_block(block_with_txs(9, vec![tx.clone()]), vec![receipt]);

        let hash = h256_to_string(tx.hash);
        let detail = f.service.get_transaction_detail(&hash).await.unwrap();
        assert_eq!(detail.from, address_to_string(wallet.address()));
        assert_eq!(detail.value, "0.001");
        assert_eq!(detail.gas_price, "20");
        assert_eq!(detail.gas_used, Some(21_000));
        assert_eq!(detail.block_number, Some(9));
        assert_eq!(detail.status, TxStatus::Failed);
        assert!(f.cache.value(&tx_key(&hash)).is_some());
    }

    #[tokio::test]
    async fn pending_transaction_is_not_found() {
        let f = fixture();
        let tx = signed_legacy_tx(&test_wallet(), 1, true);
        f.provider
            .transactions
            .lock()
            .unwrap()
            .insert(tx.hash, tx.clone());

        let result = f
            .service
            .get_transaction_detail(&h256_to_string(tx.hash))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(f.cache.sets.load(Ordering::SeqCst), 0);
    }
}
