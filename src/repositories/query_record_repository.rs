use crate::errors::error::AppError;
use crate::models::QueryRecord;
use crate::models::db::query_record_db::QueryRecordInsert;
use crate::models::db::schema::query_records_db;
use crate::repositories::base::repository_base::{RepositoryBase, map_diesel_error};
use diesel_async::RunQueryDsl;

#[derive(Clone)]
pub struct QueryRecordRepository {
    base: RepositoryBase,
}

impl QueryRecordRepository {
    pub fn new(base: RepositoryBase) -> Self {
        Self { base }
    }

    pub async fn save(&self, record: &QueryRecord) -> Result<(), AppError> {
        let mut conn = self.base.get_connection().await?;
        diesel::insert_into(query_records_db)
            .values(QueryRecordInsert::from(record))
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
