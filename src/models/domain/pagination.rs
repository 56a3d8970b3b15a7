use crate::models::domain::transaction::{TransactionRecord, TxCategory};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// 页码从 1 开始；非法值回退到默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let size = size
            .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.size - 1) / self.size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 交易列表筛选条件，均为可选
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub tx_type: Option<TxCategory>,
    /// 匹配发送方或接收方
    pub address: Option<String>,
    pub block_number: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionRecord>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        assert_eq!(Pagination::new(Some(0), Some(500)), Pagination { page: 1, size: 10 });
        assert_eq!(Pagination::new(Some(3), Some(25)).offset(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination::new(Some(1), Some(10));
        assert_eq!(p.total_pages(25), 3);
        assert_eq!(p.total_pages(20), 2);
        assert_eq!(p.total_pages(0), 0);
    }
}
