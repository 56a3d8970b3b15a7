pub mod block;
pub mod pagination;
pub mod query_record;
pub mod transaction;
pub mod transfer;

pub use block::{BlockInfo, BlockRecord};
pub use pagination::{Pagination, TransactionFilter, TransactionPage};
pub use query_record::{QueryRecord, QueryType};
pub use transaction::{TransactionDetail, TransactionRecord, TxCategory, TxStatus};
pub use transfer::{ERC20_TRANSFER_TOPIC, TokenTransfer};
