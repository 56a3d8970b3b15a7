use crate::errors::error::AppError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 交易分类（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxCategory {
    EthTransfer,
    Erc20Transfer,
    ContractCall,
}

impl TxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxCategory::EthTransfer => "eth_transfer",
            TxCategory::Erc20Transfer => "erc20_transfer",
            TxCategory::ContractCall => "contract_call",
        }
    }
}

impl fmt::Display for TxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eth_transfer" => Ok(TxCategory::EthTransfer),
            "erc20_transfer" => Ok(TxCategory::Erc20Transfer),
            "contract_call" => Ok(TxCategory::ContractCall),
            other => Err(AppError::Validation(format!("unknown tx_type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Success,
    Failed,
}

impl TxStatus {
    /// receipt.status == 1 视为成功，其余（包括缺失）视为失败
    pub fn from_receipt_status(status: Option<ethers_core::types::U64>) -> Self {
        match status {
            Some(s) if s.as_u64() == 1 => TxStatus::Success,
            _ => TxStatus::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Success => "success",
            TxStatus::Failed => "failed",
        }
    }
}

impl FromStr for TxStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(TxStatus::Success),
            "failed" => Ok(TxStatus::Failed),
            other => Err(AppError::Conversion(format!("unknown status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_hash: String,
    pub block_number: i64,
    pub from_address: String,
    /// 合约创建交易没有接收方
    pub to_address: Option<String>,
    /// ETH 单位的十进制字符串
    pub value: String,
    pub gas_limit: i64,
    pub gas_price: String,
    pub gas_used: Option<i64>,
    pub tx_type: TxCategory,
    pub status: TxStatus,
    pub created_at: NaiveDateTime,
    /// 仅查询时填充：erc20_transfer 对应的代币数量（原始整数单位）
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub erc20_amount: Option<String>,
}

/// 交易详情查询结果，整体序列化后写入缓存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub tx_hash: String,
    pub from: String,
    pub to: Option<String>,
    #[serde(rename = "value_eth")]
    pub value: String,
    pub gas_used: Option<u64>,
    #[serde(rename = "gas_price_gwei")]
    pub gas_price: String,
    pub block_number: Option<u64>,
    pub status: TxStatus,
}
