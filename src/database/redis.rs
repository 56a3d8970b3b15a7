use crate::config::RedisConfig;
use crate::errors::error::AppError;
use redis::{Client as RedisClient, aio::ConnectionManager};

pub fn redis_url(config: &RedisConfig) -> String {
    if config.username.is_empty() {
        format!(
            "redis://:{}@{}:{}/{}",
            config.password, config.host, config.port, config.db
        )
    } else {
        format!(
            "redis://{}:{}@{}:{}/{}",
            config.username, config.password, config.host, config.port, config.db
        )
    }
}

/// 初始化 Redis 异步连接管理器（支持自动重连）
pub async fn create_redis_manager(config: &RedisConfig) -> Result<ConnectionManager, AppError> {
    let client = RedisClient::open(redis_url(config))?;
    let manager = ConnectionManager::new(client).await?;

    // 启动时 PING 一次，尽早暴露配置错误
    let mut conn = manager.clone();
    let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
    if pong != "PONG" {
        return Err(AppError::Validation(format!(
            "Redis PING response is not PONG: {}",
            pong
        )));
    }

    tracing::info!("✅ Redis ConnectionManager initialized: {}:{}", config.host, config.port);
    Ok(manager)
}
