use crate::config::DatabaseConfig;
use crate::errors::error::AppError;
use diesel_async::AsyncConnection;
use diesel_async::pg::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::scoped_futures::ScopedFutureExt;
use futures_util::future::BoxFuture;
use std::time::Duration;

// 异步池类型
pub type AsyncDbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

pub fn database_url(config: &DatabaseConfig) -> String {
    format!(
        "postgresql://{}:{}@{}:{}/{}",
        config.username, config.password, config.host, config.port, config.database_name
    )
}

pub async fn create_async_db_pool(config: &DatabaseConfig) -> Result<AsyncDbPool, AppError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url(config));
    Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout_seconds)))
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool(e.to_string()))
}

#[async_trait::async_trait]
pub trait TransactionExecutor: Send + Sync {
    /// 在同一个数据库事务中执行闭包，闭包返回的 Future 绑定连接的生命周期
    async fn execute_tx<F, T>(&self, f: F) -> Result<T, AppError>
    where
        T: Send,
        F: for<'a> FnOnce(&'a mut AsyncPgConnection) -> BoxFuture<'a, Result<T, AppError>> + Send;
}

#[derive(Clone)]
pub struct DbService {
    pub pool: AsyncDbPool,
}

impl DbService {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn get_connection(&self) -> Result<DbConnection<'_>, AppError> {
        self.pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool(e.to_string()))
    }
}

#[async_trait::async_trait]
impl TransactionExecutor for DbService {
    async fn execute_tx<F, T>(&self, f: F) -> Result<T, AppError>
    where
        T: Send,
        F: for<'a> FnOnce(&'a mut AsyncPgConnection) -> BoxFuture<'a, Result<T, AppError>> + Send,
    {
        let mut conn = self.get_connection().await?;
        conn.transaction::<T, AppError, _>(|c| f(c).scope_boxed())
            .await
    }
}
