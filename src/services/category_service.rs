use sqlx::PgExecutor;

use super::{ServiceError, ServiceResult};
use crate::database::models::Category;

/// Resolve a category by exact name, creating it on first use.
///
/// A single upsert keyed on the unique name, so concurrent first uses converge on one row.
pub async fn find_or_create<'e, E>(executor: E, name: &str) -> ServiceResult<Category>
where
    E: PgExecutor<'e>,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("Category is required"));
    }
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id, name",
    )
    .bind(name)
    .fetch_one(executor)
    .await?;
    Ok(category)
}
