use config;
use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub ethereum: EthereumConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// PostgreSQL 连接配置（结构化管理）
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub username: String,
    pub password: String,
    // 连接池优化参数
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db: i64,
    /// 查询缓存过期时间（秒）
    pub cache_ttl_secs: u64,
}

impl RedisConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EthereumConfig {
    pub rpc_url: String,
    /// 逗号分隔，为空时直接使用 rpc_url
    pub api_keys: String,
    pub max_retries: usize,
    pub base_delay_secs: u64,
    /// 扫块时相邻区块之间的间隔（毫秒）
    pub scan_delay_ms: u64,
}

impl EthereumConfig {
    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }
}

/// 按客户端 IP 的令牌桶限流参数
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub burst: u32,
    pub max_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 100,
            burst: 100,
            max_clients: 10_000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__REDIS__HOST=... 形式覆盖
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
