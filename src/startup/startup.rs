use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::database::diesel::{DbService, create_async_db_pool};
use crate::database::redis::create_redis_manager;
use crate::errors::error::AppError;
use crate::infrastructure::cache::{CacheStore, RedisCache};
use crate::infrastructure::provider::{EthereumProvider, ProviderTrait, RetryAdapter};
use crate::log_info;
use crate::repositories::{ChainRepository, PgChainRepository};
use crate::services::{BlockScanner, QueryService, RateLimiter, ScanService, TransactionService};

pub type Result<T> = std::result::Result<T, AppError>;

/// 应用程序启动与管理结构体：HTTP API + 后台扫块任务
pub struct Application {
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// 初始化数据库、Redis、RPC Provider 并绑定监听端口，不启动服务
    pub async fn build(config: Config) -> Result<Self> {
        let db_pool = create_async_db_pool(&config.database).await?;
        let db_service = Arc::new(DbService::new(db_pool));
        info!("Diesel database pool initialized successfully");
        let repository: Arc<dyn ChainRepository> = Arc::new(PgChainRepository::new(db_service));

        let redis = create_redis_manager(&config.redis).await?;
        let cache: Arc<dyn CacheStore> = Arc::new(RedisCache::new(redis));

        // provider 池（支持多个 api_key）外面包一层重试
        let eth_provider = Arc::new(EthereumProvider::new(&config.ethereum)?);
        let provider = Arc::new(RetryAdapter::new(
            eth_provider,
            config.ethereum.max_retries,
            Duration::from_secs(config.ethereum.base_delay_secs),
        )) as Arc<dyn ProviderTrait>;

        let scanner = Arc::new(BlockScanner::new(
            provider.clone(),
            repository.clone(),
            config.ethereum.scan_delay(),
        ));
        let state = AppState {
            query: Arc::new(QueryService::new(
                provider,
                cache,
                repository.clone(),
                config.redis.cache_ttl(),
            )),
            transactions: Arc::new(TransactionService::new(repository)),
            scans: Arc::new(ScanService::new(scanner)),
            limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
        };

        let address = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&address).await?;
        log_info!("HTTP 服务监听于 {}", address);

        Ok(Self { listener, state })
    }

    /// 启动 HTTP 服务，Ctrl+C 时停止当前扫描并优雅退出
    pub async fn run(self) -> anyhow::Result<()> {
        let scans = self.state.scans.clone();
        let router = api::router(self.state);

        axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("监听退出信号失败: {}", e);
            }
            log_info!("⚠️  Received shutdown signal, exiting...");
            scans.stop();
        })
        .await?;

        log_info!("✔️ HTTP server stopped");
        Ok(())
    }
}
