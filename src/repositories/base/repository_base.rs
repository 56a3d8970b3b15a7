use crate::database::diesel::{DbConnection, DbService};
use crate::errors::error::AppError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::sync::Arc;

// 通用仓储基类：连接获取 + Diesel 错误映射
#[derive(Clone)]
pub struct RepositoryBase {
    pub db: Arc<DbService>,
}

impl RepositoryBase {
    pub fn new(db: Arc<DbService>) -> Self {
        Self { db }
    }

    pub async fn get_connection(&self) -> Result<DbConnection<'_>, AppError> {
        self.db.get_connection().await
    }
}

/// 唯一约束冲突映射为 Conflict，NotFound 映射为业务错误，其余保留原始错误
pub fn map_diesel_error(e: DieselError) -> AppError {
    match e {
        DieselError::NotFound => AppError::NotFound("Resource not found in database".to_string()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            AppError::Conflict(format!(
                "Unique constraint violation: table={}, constraint={}, detail={}",
                info.table_name().unwrap_or("unknown"),
                info.constraint_name().unwrap_or("unknown"),
                info.details().unwrap_or(info.message())
            ))
        }
        other => AppError::DatabaseQuery(other),
    }
}
