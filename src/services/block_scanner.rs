use crate::errors::error::AppError;
use crate::infrastructure::parser::{classify_transaction, extract_transfers, recover_sender};
use crate::infrastructure::provider::ProviderTrait;
use crate::models::{BlockRecord, TransactionRecord, TxCategory, TxStatus};
use crate::repositories::ChainRepository;
use crate::utils::{
    address_to_string, h256_to_string, option_u64_to_i64, u64_to_i64, u256_to_i64, wei_to_ether,
};
use crate::{log_error, log_info, log_warn};
use chrono::{DateTime, NaiveDateTime};
use ethers::prelude::U64;
use ethers_core::types::{Block, BlockNumber, Transaction};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// 协作式取消标记，只在区块边界检查
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanOutcome {
    Completed {
        start: u64,
        end: u64,
        scanned: u64,
        failed: u64,
    },
    Cancelled {
        next_height: u64,
    },
}

pub struct BlockScanner {
    provider: Arc<dyn ProviderTrait>,
    repository: Arc<dyn ChainRepository>,
    scan_delay: Duration,
    current: Mutex<CancelFlag>,
}

impl BlockScanner {
    pub fn new(
        provider: Arc<dyn ProviderTrait>,
        repository: Arc<dyn ChainRepository>,
        scan_delay: Duration,
    ) -> Self {
        Self {
            provider,
            repository,
            scan_delay,
            current: Mutex::new(CancelFlag::new()),
        }
    }

    /// 每次扫描使用新的取消标记，stop() 只影响当前这一轮
    pub async fn start_scan(&self, from_height: u64) -> Result<ScanOutcome, AppError> {
        let flag = self.begin_run();
        self.scan_range(from_height, &flag).await
    }

    /// 安装新一轮的取消标记，此后的 stop() 作用于这一轮
    pub fn begin_run(&self) -> CancelFlag {
        let flag = CancelFlag::new();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = flag.clone();
        flag
    }

    pub fn stop(&self) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    async fn resolve_start(&self, from_height: u64) -> Result<u64, AppError> {
        if from_height > 0 {
            return Ok(from_height);
        }
        let latest = self.repository.latest_block_height().await?;
        Ok(u64::try_from(latest).unwrap_or(0) + 1)
    }

    pub async fn scan_range(
        &self,
        from_height: u64,
        cancel: &CancelFlag,
    ) -> Result<ScanOutcome, AppError> {
        let start = self.resolve_start(from_height).await?;
        // 链头只取一次，扫描期间新产生的区块留给下一轮
        let end = self.provider.get_last_block_number().await?.as_u64();
        log_info!("开始扫描区块: {} → {}", start, end);

        let mut scanned = 0u64;
        let mut failed = 0u64;
        for height in start..=end {
            if cancel.is_cancelled() {
                log_info!("扫描已取消，下一个待扫描区块: {}", height);
                return Ok(ScanOutcome::Cancelled {
                    next_height: height,
                });
            }

            match self.scan_block(height).await {
                Ok(()) => scanned += 1,
                Err(e) => {
                    failed += 1;
                    log_error!("扫描区块 {} 失败，跳过: {}", height, e);
                }
            }

            if height < end && !self.scan_delay.is_zero() {
                tokio::time::sleep(self.scan_delay).await;
            }
        }

        log_info!(
            "扫描完成: {} → {}，成功 {} 个，失败 {} 个",
            start,
            end,
            scanned,
            failed
        );
        Ok(ScanOutcome::Completed {
            start,
            end,
            scanned,
            failed,
        })
    }

    async fn scan_block(&self, height: u64) -> Result<(), AppError> {
        let block = self
            .provider
            .get_block_with_txs(BlockNumber::Number(U64::from(height)))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("block {}", height)))?;
        let block_number = u64_to_i64(height)?;

        for tx in &block.transactions {
            if let Err(e) = self.process_transaction(tx, block_number).await {
                log_error!("处理交易 {} 失败: {}", h256_to_string(tx.hash), e);
            }
        }

        // 交易先于区块入库：中途崩溃时该区块不会被认为已扫描
        self.repository.save_block(&block_record(&block)?).await
    }

    async fn process_transaction(&self, tx: &Transaction, block_number: i64) -> Result<(), AppError> {
        let tx_hash = h256_to_string(tx.hash);
        let receipt = self
            .provider
            .get_transaction_receipt(tx.hash)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("receipt {}", tx_hash)))?;

        let from = recover_sender(tx)?;
        let category = classify_transaction(tx, &receipt);
        let now = now();

        let record = TransactionRecord {
            tx_hash: tx_hash.clone(),
            block_number,
            from_address: address_to_string(from),
            to_address: tx.to.map(address_to_string),
            value: wei_to_ether(Some(tx.value)),
            gas_limit: u256_to_i64(tx.gas)?,
            gas_price: wei_to_ether(tx.gas_price.or(receipt.effective_gas_price)),
            gas_used: receipt.gas_used.map(u256_to_i64).transpose()?,
            tx_type: category,
            status: TxStatus::from_receipt_status(receipt.status),
            created_at: now,
            erc20_amount: None,
        };
        self.repository.save_transaction(&record).await?;

        if category == TxCategory::Erc20Transfer {
            for transfer in extract_transfers(&tx_hash, &receipt.logs, now) {
                if let Err(e) = self.repository.save_transfer(&transfer).await {
                    log_warn!("保存 ERC20 转账记录失败 (tx={}): {}", tx_hash, e);
                }
            }
        }
        Ok(())
    }
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

fn block_record(block: &Block<Transaction>) -> Result<BlockRecord, AppError> {
    let timestamp = i64::try_from(block.timestamp.low_u64())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| AppError::Conversion(format!("区块时间戳越界: {}", block.timestamp)))?;

    Ok(BlockRecord {
        block_number: option_u64_to_i64(block.number)?,
        block_hash: block.hash.map(h256_to_string).unwrap_or_default(),
        timestamp,
        transactions_count: i32::try_from(block.transactions.len())
            .map_err(|e| AppError::Conversion(e.to_string()))?,
        gas_used: u256_to_i64(block.gas_used)?,
        gas_limit: u256_to_i64(block.gas_limit)?,
        miner: block.author.map(address_to_string).unwrap_or_default(),
        created_at: now(),
    })
}
