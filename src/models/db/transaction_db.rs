use crate::errors::error::AppError;
use crate::models::db::schema::transactions;
use crate::models::domain::transaction::TransactionRecord;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};
use std::str::FromStr;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub struct TransactionInsert {
    pub tx_hash: String,
    pub block_number: i64,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value: BigDecimal,
    pub gas_limit: i64,
    pub gas_price: BigDecimal,
    pub gas_used: Option<i64>,
    pub tx_type: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransactionRow {
    pub tx_hash: String,
    pub block_number: i64,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value: BigDecimal,
    pub gas_limit: i64,
    pub gas_price: BigDecimal,
    pub gas_used: Option<i64>,
    pub tx_type: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

fn parse_decimal(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::Conversion(format!("{} ({}) 转换为 BigDecimal 失败: {}", field, raw, e)))
}

impl TryFrom<&TransactionRecord> for TransactionInsert {
    type Error = AppError;

    fn try_from(tx: &TransactionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_hash: tx.tx_hash.clone(),
            block_number: tx.block_number,
            from_address: tx.from_address.clone(),
            to_address: tx.to_address.clone(),
            value: parse_decimal("value", &tx.value)?,
            gas_limit: tx.gas_limit,
            gas_price: parse_decimal("gas_price", &tx.gas_price)?,
            gas_used: tx.gas_used,
            tx_type: tx.tx_type.as_str().to_string(),
            status: tx.status.as_str().to_string(),
            created_at: tx.created_at,
        })
    }
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_type: row.tx_type.parse()?,
            status: row.status.parse()?,
            tx_hash: row.tx_hash,
            block_number: row.block_number,
            from_address: row.from_address,
            to_address: row.to_address,
            value: row.value.normalized().to_plain_string(),
            gas_limit: row.gas_limit,
            gas_price: row.gas_price.normalized().to_plain_string(),
            gas_used: row.gas_used,
            created_at: row.created_at,
            erc20_amount: None,
        })
    }
}
