//! 单元测试用的内存替身：链上访问、持久化、缓存，以及真实签名的交易构造
use crate::errors::error::AppError;
use crate::infrastructure::cache::CacheStore;
use crate::infrastructure::provider::ProviderTrait;
use crate::models::{
    BlockRecord, ERC20_TRANSFER_TOPIC, Pagination, QueryRecord, TokenTransfer, TransactionFilter,
    TransactionRecord, TxCategory,
};
use crate::services::block_scanner::CancelFlag;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use ethers::signers::{LocalWallet, Signer};
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{
    Address, Block, BlockNumber, Bytes, Eip1559TransactionRequest, H256, Log, Transaction,
    TransactionReceipt, TransactionRequest, U64, U256,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

pub fn transfer_log(token: Address, from: Address, to: Address, amount: U256) -> Log {
    let mut data = [0u8; 32];
    amount.to_big_endian(&mut data);
    Log {
        address: token,
        topics: vec![*ERC20_TRANSFER_TOPIC, H256::from(from), H256::from(to)],
        data: Bytes::from(data.to_vec()),
        ..Default::default()
    }
}

pub fn test_wallet() -> LocalWallet {
    "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
        .parse()
        .unwrap()
}

fn legacy_request(nonce: u64, input: Bytes) -> TransactionRequest {
    TransactionRequest::new()
        .to(Address::repeat_byte(0x42))
        .value(U256::exp10(15))
        .nonce(nonce)
        .gas(21_000u64)
        .gas_price(U256::from(20_000_000_000u64))
        .data(input)
}

fn into_transaction(
    request: &TransactionRequest,
    typed: &TypedTransaction,
    signature: ethers_core::types::Signature,
    from: Address,
    chain_id: Option<U256>,
) -> Transaction {
    Transaction {
        hash: typed.hash(&signature),
        nonce: request.nonce.unwrap_or_default(),
        from,
        to: Some(Address::repeat_byte(0x42)),
        value: request.value.unwrap_or_default(),
        gas_price: request.gas_price,
        gas: request.gas.unwrap_or_default(),
        input: request.data.clone().unwrap_or_default(),
        v: U64::from(signature.v),
        r: signature.r,
        s: signature.s,
        chain_id,
        ..Default::default()
    }
}

/// EIP-155 签名的 legacy 交易；declare_chain_id 为 false 时模拟节点不返回 chainId 字段
pub fn signed_legacy_tx(wallet: &LocalWallet, chain_id: u64, declare_chain_id: bool) -> Transaction {
    signed_tx_with_input(wallet, chain_id, declare_chain_id, 0, Bytes::default())
}

pub fn signed_tx_with_input(
    wallet: &LocalWallet,
    chain_id: u64,
    declare_chain_id: bool,
    nonce: u64,
    input: Bytes,
) -> Transaction {
    let request = legacy_request(nonce, input).chain_id(chain_id);
    let typed: TypedTransaction = request.clone().into();
    let signature = wallet.sign_transaction_sync(&typed).unwrap();
    into_transaction(
        &request,
        &typed,
        signature,
        wallet.address(),
        declare_chain_id.then(|| U256::from(chain_id)),
    )
}

/// EIP-1559 类型交易，节点总会返回 chainId
pub fn signed_eip1559_tx(wallet: &LocalWallet, chain_id: u64) -> Transaction {
    let request = Eip1559TransactionRequest::new()
        .to(Address::repeat_byte(0x42))
        .value(U256::exp10(15))
        .nonce(0u64)
        .gas(21_000u64)
        .max_fee_per_gas(U256::from(30_000_000_000u64))
        .max_priority_fee_per_gas(U256::from(1_000_000_000u64))
        .chain_id(chain_id);
    let typed: TypedTransaction = request.into();
    let signature = wallet.sign_transaction_sync(&typed).unwrap();
    Transaction {
        hash: typed.hash(&signature),
        nonce: U256::zero(),
        from: wallet.address(),
        to: Some(Address::repeat_byte(0x42)),
        value: U256::exp10(15),
        gas: U256::from(21_000u64),
        max_fee_per_gas: Some(U256::from(30_000_000_000u64)),
        max_priority_fee_per_gas: Some(U256::from(1_000_000_000u64)),
        transaction_type: Some(U64::from(2)),
        access_list: Some(Default::default()),
        v: U64::from(signature.v),
        r: signature.r,
        s: signature.s,
        chain_id: Some(U256::from(chain_id)),
        ..Default::default()
    }
}

/// 不带 chain id 的 homestead 签名（v = 27/28）
pub fn homestead_signed_tx(wallet: &LocalWallet) -> Transaction {
    let request = legacy_request(0, Bytes::default());
    let typed: TypedTransaction = request.clone().into();
    let signature = wallet.sign_hash(typed.sighash()).unwrap();
    into_transaction(&request, &typed, signature, wallet.address(), None)
}

pub fn block_with_txs(number: u64, transactions: Vec<Transaction>) -> Block<Transaction> {
    Block {
        number: Some(U64::from(number)),
        hash: Some(H256::from_low_u64_be(number)),
        timestamp: U256::from(1_700_000_000u64 + number * 12),
        gas_used: U256::from(21_000u64 * transactions.len() as u64),
        gas_limit: U256::from(30_000_000u64),
        author: Some(Address::repeat_byte(0x99)),
        transactions,
        ..Default::default()
    }
}

pub fn success_receipt(tx: &Transaction, logs: Vec<Log>) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: tx.hash,
        status: Some(U64::one()),
        gas_used: Some(U256::from(21_000u64)),
        logs,
        ..Default::default()
    }
}

#[derive(Default)]
pub struct ProviderCalls {
    pub head: AtomicUsize,
    pub blocks: AtomicUsize,
    pub transactions: AtomicUsize,
    pub receipts: AtomicUsize,
    pub balances: AtomicUsize,
    pub calls: AtomicUsize,
}

/// 与 transactions 表上的 WHERE 条件一致：地址匹配发送方或接收方
fn filter_matches(filter: &TransactionFilter, tx: &TransactionRecord) -> bool {
    filter.tx_type.is_none_or(|t| t == tx.tx_type)
        && filter.block_number.is_none_or(|n| n == tx.block_number)
        && filter.address.as_deref().is_none_or(|a| {
            tx.from_address.eq_ignore_ascii_case(a)
                || tx
                    .to_address
                    .as_deref()
                    .is_some_and(|to| to.eq_ignore_ascii_case(a))
        })
}

/// 内存链：按高度存区块，按哈希存交易与回执
#[derive(Default)]
pub struct FakeProvider {
    pub head: Mutex<Option<u64>>,
    pub blocks: Mutex<HashMap<u64, Block<Transaction>>>,
    pub transactions: Mutex<HashMap<H256, Transaction>>,
    pub receipts: Mutex<HashMap<H256, TransactionReceipt>>,
    pub balances: Mutex<HashMap<Address, U256>>,
    pub call_result: Mutex<Bytes>,
    pub calls: ProviderCalls,
}

impl FakeProvider {
    /// 注册区块及其交易、回执，同时把链头推进到该高度
    pub fn add_block(&self, block: Block<Transaction>, receipts: Vec<TransactionReceipt>) {
        let number = block.number.unwrap_or_default().as_u64();
        {
            let mut txs = self.transactions.lock().unwrap();
            for tx in &block.transactions {
                txs.insert(tx.hash, tx.clone());
            }
        }
        {
            let mut map = self.receipts.lock().unwrap();
            for r in receipts {
                map.insert(r.transaction_hash, r);
            }
        }
        self.blocks.lock().unwrap().insert(number, block);
        let mut head = self.head.lock().unwrap();
        *head = Some(head.map_or(number, |h| h.max(number)));
    }

    pub fn add_empty_blocks(&self, from: u64, to: u64) {
        for n in from..=to {
            self.add_block(block_with_txs(n, vec![]), vec![]);
        }
    }
}

#[async_trait]
impl ProviderTrait for FakeProvider {
    async fn get_last_block_number(&self) -> Result<U64, AppError> {
        self.calls.head.fetch_add(1, Ordering::SeqCst);
        self.head
            .lock()
            .unwrap()
            .map(U64::from)
            .ok_or_else(|| AppError::ProviderError("connection refused".into()))
    }

    async fn get_block_with_txs(
        &self,
        number: BlockNumber,
    ) -> Result<Option<Block<Transaction>>, AppError> {
        self.calls.blocks.fetch_add(1, Ordering::SeqCst);
        let height = match number {
            BlockNumber::Number(n) => n.as_u64(),
            _ => self.head.lock().unwrap().unwrap_or_default(),
        };
        Ok(self.blocks.lock().unwrap().get(&height).cloned())
    }

    async fn get_transaction(&self, tx_hash: H256) -> Result<Option<Transaction>, AppError> {
        self.calls.transactions.fetch_add(1, Ordering::SeqCst);
        Ok(self.transactions.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, AppError> {
        self.calls.receipts.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn get_balance(&self, address: Address) -> Result<U256, AppError> {
        self.calls.balances.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn call(&self, _tx: &TypedTransaction) -> Result<Bytes, AppError> {
        self.calls.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.call_result.lock().unwrap().clone())
    }
}

/// 内存仓储，唯一约束与 PostgreSQL 一致：区块号、交易哈希重复返回 Conflict
#[derive(Default)]
pub struct FakeRepository {
    pub blocks: Mutex<Vec<BlockRecord>>,
    pub transactions: Mutex<Vec<TransactionRecord>>,
    pub transfers: Mutex<Vec<TokenTransfer>>,
    pub query_records: Mutex<Vec<QueryRecord>>,
    /// 保存到该高度的区块后触发取消，模拟扫块途中调用 stop
    pub cancel_after: Mutex<Option<(i64, CancelFlag)>>,
}

impl FakeRepository {
    pub fn block_numbers(&self) -> Vec<i64> {
        self.blocks
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.block_number)
            .collect()
    }
}

#[async_trait]
impl crate::repositories::ChainRepository for FakeRepository {
    async fn latest_block_height(&self) -> Result<i64, AppError> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.block_number)
            .max()
            .unwrap_or(0))
    }

    async fn save_block(&self, block: &BlockRecord) -> Result<(), AppError> {
        {
            let mut blocks = self.blocks.lock().unwrap();
            if blocks.iter().any(|b| b.block_number == block.block_number) {
                return Err(AppError::Conflict(format!(
                    "block {} already exists",
                    block.block_number
                )));
            }
            blocks.push(block.clone());
        }
        if let Some((height, flag)) = self.cancel_after.lock().unwrap().as_ref() {
            if *height == block.block_number {
                flag.cancel();
            }
        }
        Ok(())
    }

    async fn save_transaction(&self, tx: &TransactionRecord) -> Result<(), AppError> {
        let mut txs = self.transactions.lock().unwrap();
        if txs.iter().any(|t| t.tx_hash == tx.tx_hash) {
            return Err(AppError::Conflict(format!("tx {} already exists", tx.tx_hash)));
        }
        txs.push(tx.clone());
        Ok(())
    }

    async fn save_transfer(&self, transfer: &TokenTransfer) -> Result<(), AppError> {
        self.transfers.lock().unwrap().push(transfer.clone());
        Ok(())
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<(Vec<TransactionRecord>, i64), AppError> {
        let mut matched: Vec<TransactionRecord> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|t| filter_matches(filter, t))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        let total = matched.len() as i64;

        let transfers = self.transfers.lock().unwrap();
        let page = matched
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.size as usize)
            .map(|mut t| {
                if t.tx_type == TxCategory::Erc20Transfer {
                    t.erc20_amount = Some(
                        transfers
                            .iter()
                            .find(|tr| tr.tx_hash == t.tx_hash)
                            .map(|tr| tr.amount.clone())
                            .unwrap_or_else(|| "0".to_string()),
                    );
                }
                t
            })
            .collect();
        Ok((page, total))
    }

    async fn save_query_record(&self, record: &QueryRecord) -> Result<(), AppError> {
        self.query_records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<String, (String, Duration)>>,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    /// 为 true 时所有操作返回错误，模拟 Redis 不可用
    pub unavailable: AtomicBool,
}

impl FakeCache {
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Duration::from_secs(300)));
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("cache unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }
}
