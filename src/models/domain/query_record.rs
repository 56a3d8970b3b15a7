use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    EthBalance,
    Erc20Balance,
    Block,
    Transaction,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::EthBalance => "eth_balance",
            QueryType::Erc20Balance => "erc20_balance",
            QueryType::Block => "block",
            QueryType::Transaction => "transaction",
        }
    }
}

/// 查询审计记录，只追加不回读
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    /// 区块查询没有地址
    pub address: Option<String>,
    pub query_type: QueryType,
    pub query_param: String,
    pub created_at: NaiveDateTime,
}

impl QueryRecord {
    pub fn new(address: Option<String>, query_type: QueryType, query_param: String) -> Self {
        Self {
            address,
            query_type,
            query_param,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
