use diesel::result::Error as DieselError;
use ethers_providers::ProviderError;
use redis::RedisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // 捕获所有 SQL 执行、ORM 映射错误等。
    #[error("Database query error: {0}")]
    DatabaseQuery(#[from] DieselError),

    // 从连接池获取连接失败（通常包含底层的 ConnectionError）。
    #[error("Database connection pool error: {0}")]
    ConnectionPool(String),

    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Validation error: {0}")]
    Validation(String),

    /// 类型转换错误（String→BigDecimal、时间转换等）
    #[error("类型转换错误: {0}")]
    Conversion(String),

    /// 唯一约束冲突（重复插入同一区块/交易）
    #[error("业务冲突错误: {0}")]
    Conflict(String),

    /// 资源未找到（pending 交易、不存在的区块/收据）
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 内部不可预期错误（兜底）
    #[error("内部错误: {0}")]
    Internal(String),

    #[error("无效的tx_hash: {0}")]
    InvalidTxHash(String),

    #[error("无效的provider: {0}")]
    ProviderError(String),

    #[error("无效的区块号: {0}")]
    InvalidBlockNumber(String),

    #[error("解码越界: 请求 [{start}, {end}), 数据长度 {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("无效的URL: {0}")]
    InvalidUrl(String),

    #[error("无效的地址: {0}")]
    InvalidAddress(String),

    #[error("签名恢复失败: {0}")]
    SignatureRecovery(String),
}

impl AppError {
    /// 输入类错误：直接拒绝，不重试
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::InvalidTxHash(_)
                | AppError::InvalidBlockNumber(_)
                | AppError::InvalidRange { .. }
                | AppError::InvalidAddress(_)
        )
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::ProviderError(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Conversion(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
