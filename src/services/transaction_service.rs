use crate::errors::error::AppError;
use crate::models::{Pagination, TransactionFilter, TransactionPage};
use crate::repositories::ChainRepository;
use crate::utils::{address_to_string, parse_address};
use std::sync::Arc;

pub struct TransactionService {
    repository: Arc<dyn ChainRepository>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn ChainRepository>) -> Self {
        Self { repository }
    }

    /// 地址统一转成小写 0x 形式，与入库格式一致
    pub async fn list_transactions(
        &self,
        mut filter: TransactionFilter,
        pagination: Pagination,
    ) -> Result<TransactionPage, AppError> {
        if let Some(address) = filter.address.take() {
            filter.address = Some(address_to_string(parse_address(&address)?));
        }

        let (transactions, total) = self
            .repository
            .query_transactions(&filter, pagination)
            .await?;

        Ok(TransactionPage {
            transactions,
            total,
            page: pagination.page,
            pages: pagination.total_pages(total),
        })
    }
}
