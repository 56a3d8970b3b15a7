use crate::database::diesel::TransactionExecutor;
use crate::errors::error::AppError;
use crate::models::db::schema::{erc20_transfers, transactions};
use crate::models::db::transaction_db::{TransactionInsert, TransactionRow};
use crate::models::db::transfer_db::TransferInsert;
use crate::models::{
    Pagination, TokenTransfer, TransactionFilter, TransactionRecord, TxCategory,
};
use crate::repositories::base::repository_base::{RepositoryBase, map_diesel_error};
use bigdecimal::BigDecimal;
use diesel::pg::Pg;
use diesel::{
    BoolExpressionMethods, ExpressionMethods, NullableExpressionMethods, QueryDsl,
    SelectableHelper,
};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use futures_util::FutureExt;
use std::collections::HashMap;

#[derive(Clone)]
pub struct TransactionRepository {
    base: RepositoryBase,
}

fn filtered(filter: &TransactionFilter) -> transactions::BoxedQuery<'static, Pg> {
    let mut query = transactions::table.into_boxed();
    if let Some(tx_type) = filter.tx_type {
        query = query.filter(transactions::tx_type.eq(tx_type.as_str()));
    }
    if let Some(address) = filter.address.clone() {
        query = query.filter(
            transactions::from_address
                .nullable()
                .eq(address.clone())
                .or(transactions::to_address.eq(address)),
        );
    }
    if let Some(height) = filter.block_number {
        query = query.filter(transactions::block_number.eq(height));
    }
    query
}

async fn load_page(
    conn: &mut AsyncPgConnection,
    filter: &TransactionFilter,
    pagination: Pagination,
) -> Result<(Vec<TransactionRecord>, i64), AppError> {
    let total: i64 = filtered(filter)
        .count()
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;

    let rows: Vec<TransactionRow> = filtered(filter)
        .select(TransactionRow::as_select())
        .order((transactions::block_number.desc(), transactions::id.desc()))
        .limit(pagination.size)
        .offset(pagination.offset())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut records = rows
        .into_iter()
        .map(TransactionRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let erc20_hashes: Vec<String> = records
        .iter()
        .filter(|tx| tx.tx_type == TxCategory::Erc20Transfer)
        .map(|tx| tx.tx_hash.clone())
        .collect();

    if !erc20_hashes.is_empty() {
        let amounts: Vec<(String, BigDecimal)> = erc20_transfers::table
            .filter(erc20_transfers::tx_hash.eq_any(&erc20_hashes))
            .order(erc20_transfers::id.asc())
            .select((erc20_transfers::tx_hash, erc20_transfers::amount))
            .load(conn)
            .await
            .map_err(map_diesel_error)?;

        // 一笔交易多条 Transfer 时取第一条
        let mut by_hash: HashMap<String, String> = HashMap::new();
        for (hash, amount) in amounts {
            by_hash
                .entry(hash)
                .or_insert_with(|| amount.normalized().to_plain_string());
        }
        for tx in records
            .iter_mut()
            .filter(|tx| tx.tx_type == TxCategory::Erc20Transfer)
        {
            tx.erc20_amount = Some(by_hash.remove(&tx.tx_hash).unwrap_or_else(|| "0".to_string()));
        }
    }

    Ok((records, total))
}

impl TransactionRepository {
    pub fn new(base: RepositoryBase) -> Self {
        Self { base }
    }

    pub async fn save(&self, tx: &TransactionRecord) -> Result<(), AppError> {
        let insert = TransactionInsert::try_from(tx)?;
        let mut conn = self.base.get_connection().await?;
        diesel::insert_into(transactions::table)
            .values(&insert)
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    pub async fn save_transfer(&self, transfer: &TokenTransfer) -> Result<(), AppError> {
        let insert = TransferInsert::try_from(transfer)?;
        let mut conn = self.base.get_connection().await?;
        diesel::insert_into(erc20_transfers::table)
            .values(&insert)
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    /// count 与分页在同一个事务里执行，保证总数和当前页一致
    pub async fn query(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<(Vec<TransactionRecord>, i64), AppError> {
        let filter = filter.clone();
        self.base
            .db
            .execute_tx(move |conn| async move { load_page(conn, &filter, pagination).await }.boxed())
            .await
    }
}
