use crate::models::db::schema::query_records;
use crate::models::domain::query_record::QueryRecord;
use chrono::NaiveDateTime;
use diesel::Insertable;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = query_records)]
pub struct QueryRecordInsert {
    pub address: Option<String>,
    pub query_type: String,
    pub query_param: String,
    pub created_at: NaiveDateTime,
}

impl From<&QueryRecord> for QueryRecordInsert {
    fn from(record: &QueryRecord) -> Self {
        Self {
            address: record.address.clone(),
            query_type: record.query_type.as_str().to_string(),
            query_param: record.query_param.clone(),
            created_at: record.created_at,
        }
    }
}
