use crate::errors::error::AppError;
use crate::models::BlockRecord;
use crate::models::db::block_db::BlockInsert;
use crate::models::db::schema::blocks::dsl::{block_number, blocks};
use crate::repositories::base::repository_base::{RepositoryBase, map_diesel_error};
use diesel::dsl::max;
use diesel::QueryDsl;
use diesel_async::RunQueryDsl;

#[derive(Clone)]
pub struct BlockRepository {
    base: RepositoryBase,
}

impl BlockRepository {
    pub fn new(base: RepositoryBase) -> Self {
        Self { base }
    }

    pub async fn latest_height(&self) -> Result<i64, AppError> {
        let mut conn = self.base.get_connection().await?;
        let latest: Option<i64> = blocks
            .select(max(block_number))
            .get_result(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(latest.unwrap_or(0))
    }

    /// 普通 insert：重复高度由唯一索引拒绝并返回 Conflict
    pub async fn save(&self, block: &BlockRecord) -> Result<(), AppError> {
        let mut conn = self.base.get_connection().await?;
        diesel::insert_into(blocks)
            .values(BlockInsert::from(block))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
