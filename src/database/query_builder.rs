use sqlx::{self, postgres::PgArguments, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::filter::types::{SqlParam, SqlResult};
use crate::filter::ExpenseFilter;

/// Executes the SQL produced by an `ExpenseFilter` and maps rows to `T`.
pub struct QueryBuilder<T> {
    filter: ExpenseFilter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(filter: ExpenseFilter) -> Self {
        Self {
            filter,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn filter(&self) -> &ExpenseFilter {
        &self.filter
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.filter.to_sql();
        tracing::debug!("Expense listing SQL: {}", sql_result.query);
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let SqlResult { query, params } = self.filter.to_count_sql();
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for p in params.iter() {
            q = match p {
                SqlParam::Uuid(u) => q.bind(*u),
                SqlParam::Text(s) => q.bind(s.clone()),
                SqlParam::Date(d) => q.bind(*d),
            };
        }
        let count = q.fetch_one(pool).await?;
        Ok(count)
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Date(d) => q.bind(*d),
    }
}
