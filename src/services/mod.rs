pub mod block_scanner;
pub mod query_service;
pub mod rate_limiter;
pub mod scan_service;
pub mod transaction_service;

pub use block_scanner::BlockScanner;
pub use query_service::QueryService;
pub use rate_limiter::RateLimiter;
pub use scan_service::{ScanService, ScanStatus, ScanTicket};
pub use transaction_service::TransactionService;
