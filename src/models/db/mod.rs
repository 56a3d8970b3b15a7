pub mod block_db;
pub mod query_record_db;
pub mod schema;
pub mod transaction_db;
pub mod transfer_db;
