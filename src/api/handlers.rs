use super::response::ApiResponse;
use super::state::AppState;
use crate::errors::error::AppError;
use crate::models::{
    BlockInfo, Pagination, TransactionDetail, TransactionFilter, TransactionPage, TxCategory,
};
use crate::services::{ScanStatus, ScanTicket};
use crate::log_info;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// 空字符串视为未传
fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct BalanceData {
    pub address: String,
    pub balance: String,
}

#[derive(Debug, Serialize)]
pub struct TokenBalanceData {
    pub address: String,
    pub contract: String,
    pub balance: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub contract: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    pub from_block: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub tx_type: Option<String>,
    pub address: Option<String>,
    pub block_number: Option<String>,
}

impl TransactionsQuery {
    fn into_parts(self) -> Result<(TransactionFilter, Pagination), AppError> {
        let pagination = Pagination::new(
            non_empty(self.page).and_then(|p| p.parse().ok()),
            non_empty(self.size).and_then(|s| s.parse().ok()),
        );
        let tx_type = non_empty(self.tx_type)
            .map(|t| t.parse::<TxCategory>())
            .transpose()?;
        let block_number = non_empty(self.block_number)
            .map(|b| {
                b.parse::<i64>()
                    .ok()
                    .filter(|n| *n >= 0)
                    .ok_or(AppError::InvalidBlockNumber(b))
            })
            .transpose()?;

        Ok((
            TransactionFilter {
                tx_type,
                address: non_empty(self.address),
                block_number,
            },
            pagination,
        ))
    }
}

pub async fn eth_balance(
    State(state): State<AppState>,
    Path(addr): Path<String>,
) -> ApiResult<BalanceData> {
    let balance = state.query.get_eth_balance(&addr).await?;
    Ok(ApiResponse::ok(BalanceData {
        address: addr,
        balance,
    }))
}

pub async fn token_balance(
    State(state): State<AppState>,
    Path(addr): Path<String>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<TokenBalanceData> {
    let contract = non_empty(query.contract)
        .ok_or_else(|| AppError::Validation("缺少 contract 参数".to_string()))?;
    let balance = state.query.get_token_balance(&addr, &contract).await?;
    Ok(ApiResponse::ok(TokenBalanceData {
        address: addr,
        contract,
        balance,
    }))
}

pub async fn transaction_detail(
    State(state): State<AppState>,
    Path(tx_hash): Path<String>,
) -> ApiResult<TransactionDetail> {
    let detail = state.query.get_transaction_detail(&tx_hash).await?;
    Ok(ApiResponse::ok(detail))
}

pub async fn block_info(
    State(state): State<AppState>,
    Path(block): Path<String>,
) -> ApiResult<BlockInfo> {
    let info = state.query.get_block_info(&block).await?;
    Ok(ApiResponse::ok(info))
}

/// 立即返回回执，扫描在后台进行
pub async fn start_scan(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> ApiResult<ScanTicket> {
    let from_block = match non_empty(query.from_block) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| AppError::InvalidBlockNumber(raw))?,
        None => 0,
    };
    let ticket = state.scans.submit(from_block);
    log_info!("区块扫描已启动: run_id={}, from_block={}", ticket.run_id, from_block);
    Ok(ApiResponse::ok(ticket))
}

pub async fn scan_status(State(state): State<AppState>) -> ApiResult<ScanStatus> {
    Ok(ApiResponse::ok(state.scans.status()))
}

pub async fn stop_scan(State(state): State<AppState>) -> ApiResult<ScanStatus> {
    state.scans.stop();
    Ok(ApiResponse::ok(state.scans.status()))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> ApiResult<TransactionPage> {
    let (filter, pagination) = query.into_parts()?;
    let page = state
        .transactions
        .list_transactions(filter, pagination)
        .await?;
    Ok(ApiResponse::ok(page))
}
