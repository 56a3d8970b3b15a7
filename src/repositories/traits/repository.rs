use crate::errors::error::AppError;
use crate::models::{
    BlockRecord, Pagination, QueryRecord, TokenTransfer, TransactionFilter, TransactionRecord,
};
use async_trait::async_trait;

/// 扫块数据与查询记录的持久化契约
///
/// 重复的区块号 / 交易哈希必须返回 `AppError::Conflict`，而不是通用错误。
#[async_trait]
pub trait ChainRepository: Send + Sync {
    /// 已入库的最大区块号，空库返回 0
    async fn latest_block_height(&self) -> Result<i64, AppError>;
    async fn save_block(&self, block: &BlockRecord) -> Result<(), AppError>;
    async fn save_transaction(&self, tx: &TransactionRecord) -> Result<(), AppError>;
    async fn save_transfer(&self, transfer: &TokenTransfer) -> Result<(), AppError>;
    /// 按区块号倒序分页，返回 (当前页, 总数)；erc20_transfer 交易填充 erc20_amount
    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<(Vec<TransactionRecord>, i64), AppError>;
    async fn save_query_record(&self, record: &QueryRecord) -> Result<(), AppError>;
}
