use crate::services::{QueryService, RateLimiter, ScanService, TransactionService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub query: Arc<QueryService>,
    pub transactions: Arc<TransactionService>,
    pub scans: Arc<ScanService>,
    pub limiter: Arc<RateLimiter>,
}
