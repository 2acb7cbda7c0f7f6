//! Create resource tables from their schema descriptors. Idempotent (`IF NOT EXISTS`).

use crate::db::Database;
use crate::error::AppError;
use crate::service::TableSchema;
use crate::sql::create_table;

pub async fn apply_migrations(db: &Database, schemas: &[&TableSchema]) -> Result<(), AppError> {
    let pool = db.connection().await?;
    for schema in schemas {
        let ddl = create_table(pool.dialect(), schema);
        pool.execute_raw(&ddl).await?;
        tracing::info!(table = schema.table, "table ensured");
    }
    Ok(())
}
