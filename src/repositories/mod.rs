pub mod base;
pub mod block_repository;
pub mod query_record_repository;
pub mod traits;
pub mod transaction_repository;

use crate::database::diesel::DbService;
use crate::errors::error::AppError;
use crate::models::{
    BlockRecord, Pagination, QueryRecord, TokenTransfer, TransactionFilter, TransactionRecord,
};
use async_trait::async_trait;
use base::repository_base::RepositoryBase;
use block_repository::BlockRepository;
use query_record_repository::QueryRecordRepository;
use std::sync::Arc;
use transaction_repository::TransactionRepository;

pub use traits::ChainRepository;

/// PostgreSQL 实现：按表拆分的仓储组合成一个 ChainRepository
#[derive(Clone)]
pub struct PgChainRepository {
    blocks: BlockRepository,
    transactions: TransactionRepository,
    query_records: QueryRecordRepository,
}

impl PgChainRepository {
    pub fn new(db: Arc<DbService>) -> Self {
        let base = RepositoryBase::new(db);
        Self {
            blocks: BlockRepository::new(base.clone()),
            transactions: TransactionRepository::new(base.clone()),
            query_records: QueryRecordRepository::new(base),
        }
    }
}

#[async_trait]
impl ChainRepository for PgChainRepository {
    async fn latest_block_height(&self) -> Result<i64, AppError> {
        self.blocks.latest_height().await
    }

    async fn save_block(&self, block: &BlockRecord) -> Result<(), AppError> {
        self.blocks.save(block).await
    }

    async fn save_transaction(&self, tx: &TransactionRecord) -> Result<(), AppError> {
        self.transactions.save(tx).await
    }

    async fn save_transfer(&self, transfer: &TokenTransfer) -> Result<(), AppError> {
        self.transactions.save_transfer(transfer).await
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<(Vec<TransactionRecord>, i64), AppError> {
        self.transactions.query(filter, pagination).await
    }

    async fn save_query_record(&self, record: &QueryRecord) -> Result<(), AppError> {
        self.query_records.save(record).await
    }
}
