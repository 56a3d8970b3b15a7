use crate::models::db::schema::blocks;
use crate::models::domain::block::BlockRecord;
use chrono::NaiveDateTime;
use diesel::Insertable;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blocks)]
pub struct BlockInsert {
    pub block_number: i64,
    pub block_hash: String,
    pub timestamp: NaiveDateTime,
    pub transactions_count: i32,
    pub gas_used: i64,
    pub gas_limit: i64,
    pub miner: String,
    pub created_at: NaiveDateTime,
}

impl From<&BlockRecord> for BlockInsert {
    fn from(block: &BlockRecord) -> Self {
        Self {
            block_number: block.block_number,
            block_hash: block.block_hash.clone(),
            timestamp: block.timestamp,
            transactions_count: block.transactions_count,
            gas_used: block.gas_used,
            gas_limit: block.gas_limit,
            miner: block.miner.clone(),
            created_at: block.created_at,
        }
    }
}
