pub mod config;

pub use config::{
    Config, DatabaseConfig, EthereumConfig, RateLimitConfig, RedisConfig,
};
