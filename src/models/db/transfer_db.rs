use crate::errors::error::AppError;
use crate::models::db::schema::erc20_transfers;
use crate::models::domain::transfer::TokenTransfer;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::Insertable;
use std::str::FromStr;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = erc20_transfers)]
pub struct TransferInsert {
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub contract_address: String,
    pub amount: BigDecimal,
    pub created_at: NaiveDateTime,
}

impl TryFrom<&TokenTransfer> for TransferInsert {
    type Error = AppError;

    fn try_from(transfer: &TokenTransfer) -> Result<Self, Self::Error> {
        let amount = BigDecimal::from_str(&transfer.amount).map_err(|e| {
            AppError::Conversion(format!(
                "交易 {}: amount ({}) 转换为 BigDecimal 失败: {}",
                transfer.tx_hash, transfer.amount, e
            ))
        })?;
        Ok(Self {
            tx_hash: transfer.tx_hash.clone(),
            from_address: transfer.from_address.clone(),
            to_address: transfer.to_address.clone(),
            contract_address: transfer.contract_address.clone(),
            amount,
            created_at: transfer.created_at,
        })
    }
}
